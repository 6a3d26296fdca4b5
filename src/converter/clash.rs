//! Clash rule-provider payload reader.

use serde::Deserialize;
use std::fmt;

use crate::error::Result;
use crate::rule::{parse_cidr, validate_domain, validate_wildcard, Rule};
use crate::ruleset::RuleSet;

/// Rule provider behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClashBehavior {
    /// `example.com`, `+.example.com`, `*.example.com`
    Domain,
    /// `10.0.0.0/8`
    IpCidr,
    /// `DOMAIN-SUFFIX,example.com`
    Classical,
}

impl ClashBehavior {
    /// Parse a behavior name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "domain" => Some(ClashBehavior::Domain),
            "ipcidr" => Some(ClashBehavior::IpCidr),
            "classical" => Some(ClashBehavior::Classical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClashBehavior::Domain => "domain",
            ClashBehavior::IpCidr => "ipcidr",
            ClashBehavior::Classical => "classical",
        }
    }
}

impl fmt::Display for ClashBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule provider payload structure.
#[derive(Debug, Deserialize)]
struct ProviderPayload {
    #[serde(default)]
    payload: Vec<String>,
}

/// Clash provider converter.
#[derive(Debug, Clone, Copy)]
pub struct ClashConverter {
    behavior: ClashBehavior,
}

impl ClashConverter {
    /// Create a converter for one provider behavior.
    pub fn new(behavior: ClashBehavior) -> Self {
        Self { behavior }
    }

    /// Load a provider from YAML content.
    pub fn load_provider(&self, content: &str) -> Result<RuleSet> {
        let payload: ProviderPayload = serde_yaml::from_str(content)?;
        Ok(self.convert(&payload.payload))
    }

    /// Convert payload entries. Invalid entries are logged and skipped.
    pub fn convert<S: AsRef<str>>(&self, entries: &[S]) -> RuleSet {
        let mut set = RuleSet::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            let rule = match self.behavior {
                ClashBehavior::Domain => domain_entry(entry),
                ClashBehavior::IpCidr => parse_cidr(entry).map(Rule::from).map_err(Into::into),
                ClashBehavior::Classical => Rule::parse_line(entry),
            };
            match rule {
                Ok(rule) => {
                    set.insert(rule);
                }
                Err(e) => log::warn!("Skipping {} payload entry '{}': {}", self.behavior, entry, e),
            }
        }
        set
    }
}

fn domain_entry(entry: &str) -> Result<Rule> {
    if let Some(suffix) = entry.strip_prefix("+.").or_else(|| entry.strip_prefix('.')) {
        return Ok(Rule::DomainSuffix(validate_domain(suffix)?));
    }
    if entry.contains('*') || entry.contains('?') {
        return Ok(Rule::DomainWildcard(validate_wildcard(entry)?));
    }
    Ok(Rule::Domain(validate_domain(entry)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_payload() {
        let yaml = r#"
payload:
  - '+.google.com'
  - '.youtube.com'
  - 'www.google.com'
  - '*.cdn.example.com'
  - 'example.org'
"#;
        let set = ClashConverter::new(ClashBehavior::Domain)
            .load_provider(yaml)
            .unwrap();
        let model = set.to_model();
        assert_eq!(model.domain_suffix, vec!["google.com", "youtube.com"]);
        assert_eq!(model.domain, vec!["example.org"]);
        assert_eq!(model.domain_wildcard, vec!["*.cdn.example.com"]);
    }

    #[test]
    fn test_ipcidr_payload() {
        let yaml = "payload:\n  - '192.168.0.0/16'\n  - '192.168.1.0/24'\n  - 'fc00::/7'\n  - 'nope'\n";
        let model = ClashConverter::new(ClashBehavior::IpCidr)
            .load_provider(yaml)
            .unwrap()
            .to_model();
        assert_eq!(model.ip_cidr.len(), 1);
        assert_eq!(model.ip_cidr6.len(), 1);
    }

    #[test]
    fn test_classical_payload() {
        let entries = [
            "DOMAIN-SUFFIX,example.com",
            "IP-CIDR,10.0.0.0/8,no-resolve",
            "PROCESS-NAME,curl",
            "MATCH,DIRECT",
            "OR,((DOMAIN,a.com),(DOMAIN,b.com))",
        ];
        let model = ClashConverter::new(ClashBehavior::Classical)
            .convert(&entries[..])
            .to_model();
        assert_eq!(model.domain_suffix, vec!["example.com"]);
        assert_eq!(model.ip_cidr.len(), 1);
        assert_eq!(model.process, vec!["curl"]);
        assert_eq!(model.logical.len(), 1);
    }

    #[test]
    fn test_empty_payload() {
        let set = ClashConverter::new(ClashBehavior::Domain)
            .load_provider("payload: []")
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_behavior_parse() {
        assert_eq!(ClashBehavior::parse("IPCIDR"), Some(ClashBehavior::IpCidr));
        assert_eq!(ClashBehavior::parse("classical"), Some(ClashBehavior::Classical));
        assert_eq!(ClashBehavior::parse("rule"), None);
    }
}
