//! `OP,((child),(child))` text rendering with per-client leaf vocabularies.

use crate::error::SerializeError;
use crate::rule_type::{LogicalOperator, RuleType};

use super::{ConcreteRule, LogicalTree, NodeId, NodeKind};

/// Leaf vocabulary of one client.
pub trait TextDialect {
    /// Client name used in error messages.
    fn client(&self) -> &'static str;

    /// Render one leaf as `TYPE,value...`, or reject it.
    fn render_leaf(&self, rule: &ConcreteRule, path: &str) -> Result<String, SerializeError>;
}

fn unsupported(client: &'static str, rule: &ConcreteRule, path: &str) -> SerializeError {
    SerializeError::UnsupportedRuleType {
        client,
        rule_type: rule.rule_type().as_str(),
        path: path.to_string(),
    }
}

/// Every leaf type as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonical;

impl TextDialect for Canonical {
    fn client(&self) -> &'static str {
        "canonical"
    }

    fn render_leaf(&self, rule: &ConcreteRule, _path: &str) -> Result<String, SerializeError> {
        Ok(rule.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SurgeDialect;

impl TextDialect for SurgeDialect {
    fn client(&self) -> &'static str {
        "surge"
    }

    fn render_leaf(&self, rule: &ConcreteRule, path: &str) -> Result<String, SerializeError> {
        match rule.rule_type() {
            RuleType::Domain
            | RuleType::DomainSuffix
            | RuleType::DomainKeyword
            | RuleType::DomainWildcard
            | RuleType::IpCidr
            | RuleType::IpCidr6
            | RuleType::IpAsn
            | RuleType::GeoIp
            | RuleType::UserAgent
            | RuleType::UrlRegex
            | RuleType::ProcessName
            | RuleType::SrcIp
            | RuleType::SrcPort
            | RuleType::InPort
            | RuleType::DestPort
            | RuleType::Protocol
            | RuleType::HostnameType => Ok(rule.to_string()),
            RuleType::DomainRegex => Err(unsupported(self.client(), rule, path)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoonDialect;

impl TextDialect for LoonDialect {
    fn client(&self) -> &'static str {
        "loon"
    }

    fn render_leaf(&self, rule: &ConcreteRule, path: &str) -> Result<String, SerializeError> {
        match rule.rule_type() {
            RuleType::Domain
            | RuleType::DomainSuffix
            | RuleType::DomainKeyword
            | RuleType::IpCidr
            | RuleType::IpCidr6
            | RuleType::IpAsn
            | RuleType::GeoIp
            | RuleType::UserAgent
            | RuleType::UrlRegex
            | RuleType::SrcPort
            | RuleType::DestPort
            | RuleType::Protocol => Ok(rule.to_string()),
            RuleType::DomainWildcard
            | RuleType::DomainRegex
            | RuleType::ProcessName
            | RuleType::SrcIp
            | RuleType::InPort
            | RuleType::HostnameType => Err(unsupported(self.client(), rule, path)),
        }
    }
}

/// Clash (mihomo) rule names: `PROTOCOL` becomes `NETWORK`, `DEST-PORT` becomes `DST-PORT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClashDialect;

impl TextDialect for ClashDialect {
    fn client(&self) -> &'static str {
        "clash"
    }

    fn render_leaf(&self, rule: &ConcreteRule, path: &str) -> Result<String, SerializeError> {
        let values = rule.values().join(",");
        let name = match rule.rule_type() {
            RuleType::Protocol => {
                let network = rule.value().to_ascii_lowercase();
                if network != "tcp" && network != "udp" {
                    return Err(SerializeError::UnsupportedValue {
                        client: self.client(),
                        rule_type: RuleType::Protocol.as_str(),
                        value: rule.value().to_string(),
                        path: path.to_string(),
                    });
                }
                return Ok(format!("NETWORK,{}", network));
            }
            RuleType::DestPort => "DST-PORT",
            RuleType::SrcIp => "SRC-IP-CIDR",
            RuleType::Domain
            | RuleType::DomainSuffix
            | RuleType::DomainKeyword
            | RuleType::DomainWildcard
            | RuleType::DomainRegex
            | RuleType::IpCidr
            | RuleType::IpCidr6
            | RuleType::IpAsn
            | RuleType::GeoIp
            | RuleType::ProcessName
            | RuleType::SrcPort
            | RuleType::InPort => rule.rule_type().as_str(),
            RuleType::UserAgent | RuleType::UrlRegex | RuleType::HostnameType => {
                return Err(unsupported(self.client(), rule, path))
            }
        };
        Ok(format!("{},{}", name, values))
    }
}

/// Render a tree in the given dialect.
pub fn to_text<D: TextDialect + ?Sized>(
    tree: &LogicalTree,
    dialect: &D,
) -> Result<String, SerializeError> {
    render(tree, tree.root(), dialect)
}

fn render<D: TextDialect + ?Sized>(
    tree: &LogicalTree,
    id: NodeId,
    dialect: &D,
) -> Result<String, SerializeError> {
    match tree.kind(id) {
        NodeKind::Rule(rule) => dialect.render_leaf(rule, &tree.path(id)),
        NodeKind::Operator { op, children } => {
            let arity_ok = match op {
                LogicalOperator::Not => children.len() == 1,
                LogicalOperator::And | LogicalOperator::Or => children.len() >= 2,
            };
            if !arity_ok {
                return Err(SerializeError::InvalidArity {
                    operator: op.as_str(),
                    found: children.len(),
                    path: tree.path(id),
                });
            }
            let parts = children
                .iter()
                .map(|child| render(tree, *child, dialect).map(|s| format!("({})", s)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("{},({})", op, parts.join(",")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> LogicalTree {
        LogicalTree::parse(text).unwrap()
    }

    #[test]
    fn test_canonical_matches_tree_text() {
        let t = tree("OR,((DOMAIN-REGEX,^a\\.com$),(NOT,((HOSTNAME-TYPE,IPv4))))");
        assert_eq!(to_text(&t, &Canonical).unwrap(), t.canonical());
    }

    #[test]
    fn test_surge_rejects_regex() {
        let t = tree("AND,((DOMAIN,a.com),(DOMAIN-REGEX,^b\\.com$))");
        let err = to_text(&t, &SurgeDialect).unwrap_err();
        assert_eq!(
            err,
            SerializeError::UnsupportedRuleType {
                client: "surge",
                rule_type: "DOMAIN-REGEX",
                path: "AND[1] > DOMAIN-REGEX".to_string(),
            }
        );
        let ok = tree("AND,((DOMAIN,a.com),(PROTOCOL,UDP))");
        assert_eq!(
            to_text(&ok, &SurgeDialect).unwrap(),
            "AND,((DOMAIN,a.com),(PROTOCOL,UDP))"
        );
    }

    #[test]
    fn test_loon_vocabulary() {
        let t = tree("OR,((DOMAIN-SUFFIX,a.com),(PROCESS-NAME,curl))");
        assert!(matches!(
            to_text(&t, &LoonDialect),
            Err(SerializeError::UnsupportedRuleType { client: "loon", .. })
        ));
        let ok = tree("AND,((USER-AGENT,Foo*),(DEST-PORT,443))");
        assert_eq!(
            to_text(&ok, &LoonDialect).unwrap(),
            "AND,((USER-AGENT,Foo*),(DEST-PORT,443))"
        );
    }

    #[test]
    fn test_clash_renames() {
        let t = tree("AND,((PROTOCOL,UDP),(DEST-PORT,443),(NOT,((SRC-IP,192.168.0.0/16))))");
        assert_eq!(
            to_text(&t, &ClashDialect).unwrap(),
            "AND,((NETWORK,udp),(DST-PORT,443),(NOT,((SRC-IP-CIDR,192.168.0.0/16))))"
        );
    }

    #[test]
    fn test_clash_rejects_values_and_types() {
        let t = tree("AND,((PROTOCOL,QUIC),(DOMAIN,a.com))");
        assert!(matches!(
            to_text(&t, &ClashDialect),
            Err(SerializeError::UnsupportedValue { value, .. }) if value == "QUIC"
        ));
        let t = tree("OR,((USER-AGENT,curl*),(DOMAIN,a.com))");
        assert!(matches!(
            to_text(&t, &ClashDialect),
            Err(SerializeError::UnsupportedRuleType { rule_type: "USER-AGENT", .. })
        ));
    }
}
