//! sing-box headless rule rendering.
//!
//! Operators become `{"type": "logical", "mode": ..., "rules": [...]}`. A
//! `NOT` has no object of its own: it sets `invert` on its child, and a chain
//! of `NOT`s flips the flag once per level.

use serde_json::{json, Map, Value};

use crate::error::SerializeError;
use crate::rule_type::{LogicalOperator, RuleType};

use super::{ConcreteRule, LogicalTree, NodeId, NodeKind};

const CLIENT: &str = "sing-box";

/// Render a tree as a sing-box rule object.
pub fn to_sing_box(tree: &LogicalTree) -> Result<Value, SerializeError> {
    render(tree, tree.root(), None)
}

fn render(tree: &LogicalTree, id: NodeId, invert: Option<bool>) -> Result<Value, SerializeError> {
    match tree.kind(id) {
        NodeKind::Rule(rule) => {
            let mut object = leaf(rule, &tree.path(id))?;
            if let Some(invert) = invert {
                object.insert("invert".to_string(), Value::Bool(invert));
            }
            Ok(Value::Object(object))
        }
        NodeKind::Operator {
            op: LogicalOperator::Not,
            children,
        } => match children.as_slice() {
            [child] => render(tree, *child, Some(!invert.unwrap_or(false))),
            _ => Err(SerializeError::InvalidArity {
                operator: LogicalOperator::Not.as_str(),
                found: children.len(),
                path: tree.path(id),
            }),
        },
        NodeKind::Operator { op, children } => {
            if children.len() < 2 {
                return Err(SerializeError::InvalidArity {
                    operator: op.as_str(),
                    found: children.len(),
                    path: tree.path(id),
                });
            }
            let rules = children
                .iter()
                .map(|child| render(tree, *child, None))
                .collect::<Result<Vec<_>, _>>()?;
            let mut object = Map::new();
            object.insert("type".to_string(), json!("logical"));
            object.insert(
                "mode".to_string(),
                json!(op.as_str().to_ascii_lowercase()),
            );
            object.insert("rules".to_string(), Value::Array(rules));
            if let Some(invert) = invert {
                object.insert("invert".to_string(), Value::Bool(invert));
            }
            Ok(Value::Object(object))
        }
    }
}

fn leaf(rule: &ConcreteRule, path: &str) -> Result<Map<String, Value>, SerializeError> {
    let value = rule.value();
    let unsupported_value = || SerializeError::UnsupportedValue {
        client: CLIENT,
        rule_type: rule.rule_type().as_str(),
        value: value.to_string(),
        path: path.to_string(),
    };

    let (field, json_value) = match rule.rule_type() {
        RuleType::Domain => ("domain", json!(value)),
        RuleType::DomainSuffix => ("domain_suffix", json!(value)),
        RuleType::DomainKeyword => ("domain_keyword", json!(value)),
        RuleType::DomainRegex => ("domain_regex", json!(rule.values().join(","))),
        RuleType::IpCidr | RuleType::IpCidr6 => ("ip_cidr", json!(value)),
        RuleType::SrcIp => ("source_ip_cidr", json!(value)),
        RuleType::ProcessName => ("process_name", json!(value)),
        RuleType::DestPort => {
            let port: u16 = value.parse().map_err(|_| unsupported_value())?;
            ("port", json!(port))
        }
        RuleType::SrcPort => {
            let port: u16 = value.parse().map_err(|_| unsupported_value())?;
            ("source_port", json!(port))
        }
        RuleType::Protocol => match value.to_ascii_lowercase().as_str() {
            network @ ("tcp" | "udp") => ("network", json!(network)),
            _ => return Err(unsupported_value()),
        },
        RuleType::DomainWildcard
        | RuleType::IpAsn
        | RuleType::GeoIp
        | RuleType::UserAgent
        | RuleType::UrlRegex
        | RuleType::InPort
        | RuleType::HostnameType => {
            return Err(SerializeError::UnsupportedRuleType {
                client: CLIENT,
                rule_type: rule.rule_type().as_str(),
                path: path.to_string(),
            })
        }
    };

    let mut object = Map::new();
    object.insert(field.to_string(), json_value);
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(text: &str) -> Result<Value, SerializeError> {
        to_sing_box(&LogicalTree::parse(text).unwrap())
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(
            render_text("NOT,((NOT,((DOMAIN,a.com))))").unwrap(),
            json!({"domain": "a.com", "invert": false})
        );
        assert_eq!(
            render_text("NOT,((NOT,((NOT,((DOMAIN,a.com))))))").unwrap(),
            json!({"domain": "a.com", "invert": true})
        );
    }

    #[test]
    fn test_logical_modes() {
        let value =
            render_text("AND,((DOMAIN-SUFFIX,a.com),(NOT,((OR,((PROTOCOL,UDP),(DEST-PORT,443))))))")
                .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "logical",
                "mode": "and",
                "rules": [
                    {"domain_suffix": "a.com"},
                    {
                        "type": "logical",
                        "mode": "or",
                        "rules": [{"network": "udp"}, {"port": 443}],
                        "invert": true
                    }
                ]
            })
        );
    }

    #[test]
    fn test_field_mapping() {
        let value = render_text("OR,((IP-CIDR6,2001:db8::/32),(SRC-IP,10.0.0.0/8))").unwrap();
        assert_eq!(value["rules"][0], json!({"ip_cidr": "2001:db8::/32"}));
        assert_eq!(value["rules"][1], json!({"source_ip_cidr": "10.0.0.0/8"}));

        let value = render_text(r"OR,((DOMAIN-REGEX,^a{1,2}\.com$),(DOMAIN,b.com))").unwrap();
        assert_eq!(value["rules"][0], json!({"domain_regex": r"^a{1,2}\.com$"}));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            render_text("AND,((DOMAIN-WILDCARD,*.a.com),(DOMAIN,b.com))"),
            Err(SerializeError::UnsupportedRuleType { client: "sing-box", .. })
        ));
        assert!(matches!(
            render_text("AND,((DEST-PORT,https),(DOMAIN,b.com))"),
            Err(SerializeError::UnsupportedValue { .. })
        ));
        assert!(matches!(
            render_text("AND,((PROTOCOL,ICMP),(DOMAIN,b.com))"),
            Err(SerializeError::UnsupportedValue { .. })
        ));
    }
}
