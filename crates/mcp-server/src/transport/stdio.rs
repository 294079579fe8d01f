//! stdio transport for MCP (newline-delimited JSON-RPC)

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::protocol::{McpError, McpMessage, RequestHandler};

/// stdio transport for MCP protocol
pub struct StdioTransport {
    handler: Arc<RequestHandler>,
}

impl StdioTransport {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        info!("Starting MCP server on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve one line-oriented stream pair. A line that is not valid JSON,
    /// or not UTF-8 at all, gets a -32700 reply and reading continues.
    ///
    /// Each request runs on its own task; responses are written by a single
    /// writer in completion order. Returns once input is exhausted and every
    /// in-flight request has been answered.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<McpMessage>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", String::from_utf8_lossy(line));

            // invalid UTF-8 is reported like any other unparseable line
            let message: McpMessage = match serde_json::from_slice(line) {
                Ok(msg) => msg,
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    let _ = tx.send(McpMessage::error_response(None, McpError::parse_error()));
                    continue;
                }
            };

            let handler = self.handler.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handler.handle(message).await {
                    let _ = tx.send(response);
                }
            });
        }

        info!("EOF received, shutting down");
        // The writer finishes once every request task has dropped its sender.
        drop(tx);
        match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::Other, e).into()),
        }
    }
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<McpMessage>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let response_line = serde_json::to_string(&response)?;
        debug!("Sending: {}", response_line);
        writer.write_all(response_line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::handler::tests::test_handler;
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    async fn run_lines(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let docs = TempDir::new().unwrap();
        let transport = StdioTransport::new(Arc::new(test_handler(&docs)));

        let (client, server) = tokio::io::duplex(64 * 1024);
        transport.serve(BufReader::new(input), server).await.unwrap();

        let mut output = String::new();
        let mut client = client;
        client.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_answers_every_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );

        let mut responses = run_lines(input).await;
        assert_eq!(responses.len(), 2, "notifications are not answered");

        responses.sort_by_key(|r| r["id"].as_i64());
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_serve_reports_parse_errors_and_continues() {
        let input = concat!("not json\n", r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#, "\n");

        let responses = run_lines(input).await;
        assert_eq!(responses.len(), 2);
        let parse_error = responses.iter().find(|r| r.get("id").is_none()).unwrap();
        assert_eq!(parse_error["error"]["code"], -32700);
        assert!(responses.iter().any(|r| r["id"] == "a"));
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let responses = run_bytes(&input).await;
        assert_eq!(responses.len(), 3);
        assert!(responses.iter().any(|r| r["id"] == 1));
        assert!(responses.iter().any(|r| r["id"] == 2));
        let parse_error = responses.iter().find(|r| r.get("id").is_none()).unwrap();
        assert_eq!(parse_error["error"]["code"], -32700);
    }
}
