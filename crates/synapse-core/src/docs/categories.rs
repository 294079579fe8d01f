//! Fixed, ordered category tables per registry source

use crate::platform::RegistrySource;

/// A test over a tool's lowercase name (and, for one XSIAM rule, its description)
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Name contains any of the keywords
    NameContains(&'static [&'static str]),
    /// Name contains `name` and description contains `description`
    NameAndDescription {
        name: &'static str,
        description: &'static str,
    },
}

impl Predicate {
    fn matches(&self, name: &str, description: &str) -> bool {
        match self {
            Predicate::NameContains(keywords) => keywords.iter().any(|k| name.contains(k)),
            Predicate::NameAndDescription {
                name: n,
                description: d,
            } => name.contains(n) && description.contains(d),
        }
    }
}

/// First rule that matches wins
#[derive(Debug, Clone, Copy)]
pub struct CategoryPolicy {
    pub rules: &'static [(Predicate, &'static str)],
    pub fallback: &'static str,
}

impl CategoryPolicy {
    pub fn for_source(source: RegistrySource) -> Self {
        match source {
            RegistrySource::Xsiam => XSIAM_POLICY,
            RegistrySource::Xsoar => XSOAR_POLICY,
            RegistrySource::Unified => UNIFIED_POLICY,
        }
    }

    pub fn categorize(&self, name: &str, description: &str) -> &'static str {
        let name = name.to_lowercase();
        let description = description.to_lowercase();
        self.rules
            .iter()
            .find(|(predicate, _)| predicate.matches(&name, &description))
            .map(|(_, category)| *category)
            .unwrap_or(self.fallback)
    }
}

use Predicate::{NameAndDescription, NameContains};

const XSIAM_POLICY: CategoryPolicy = CategoryPolicy {
    rules: &[
        (NameContains(&["xql"]), "XQL Queries"),
        (NameAndDescription { name: "query", description: "xql" }, "XQL Queries"),
        (NameContains(&["incident"]), "Incidents"),
        (NameContains(&["alert"]), "Alerts"),
        (NameContains(&["endpoint", "agent"]), "Endpoints"),
        (
            NameContains(&["host", "user", "ip_address", "ad_group", "ou_"]),
            "Assets & Identity",
        ),
        (NameContains(&["violation", "policy"]), "Policy & Compliance"),
        (
            NameContains(&["scan", "isolate", "unisolate", "quarantine", "restore"]),
            "Response Actions",
        ),
        (
            NameContains(&["hash", "reputation", "ioc", "indicator", "bioc"]),
            "Threat Intelligence",
        ),
        (NameContains(&["audit", "rbac", "role", "healthcheck"]), "Administration"),
        (NameContains(&["playbook"]), "Playbooks"),
        (NameContains(&["dashboard"]), "Dashboards"),
        (NameContains(&["script"]), "Scripts"),
    ],
    fallback: "Other Operations",
};

const XSOAR_POLICY: CategoryPolicy = CategoryPolicy {
    rules: &[
        (NameContains(&["script", "automation"]), "Automations & Scripts"),
        (NameContains(&["incident", "investigation"]), "Incidents & Investigations"),
        (NameContains(&["playbook"]), "Playbooks"),
        (NameContains(&["indicator", "ioc"]), "Indicators"),
        (NameContains(&["integration"]), "Integrations"),
        (NameContains(&["entry", "evidence"]), "Evidence & Entries"),
        (NameContains(&["user", "role", "api_key"]), "User Management"),
        (
            NameContains(&["classifier", "mapper", "layout", "content"]),
            "Content Management",
        ),
        (NameContains(&["widget", "dashboard"]), "Dashboards & Widgets"),
        (NameContains(&["get_list"]), "Lists"),
    ],
    fallback: "Other Operations",
};

const UNIFIED_POLICY: CategoryPolicy = CategoryPolicy {
    rules: &[
        (NameContains(&["incident"]), "Incidents"),
        (NameContains(&["script", "automation"]), "Automations & Scripts"),
        (NameContains(&["audit"]), "Logs & Audits"),
    ],
    fallback: "Unified Operations",
};

/// File stem for a category page: `Assets & Identity` -> `assets-and-identity`
pub fn category_slug(category: &str) -> String {
    category.to_lowercase().replace(' ', "-").replace('&', "and")
}
