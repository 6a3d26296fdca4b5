//! Egern rule-set YAML.
//!
//! Logical rules are folded into `domain_regex_set` through the regex
//! translation; rules that mention anything but host names are skipped.

use serde::Serialize;

use crate::logical::to_domain_regex;
use crate::ruleset::{SerializableRuleModel, SerializationOptions};
use crate::Result;

#[derive(Debug, Serialize)]
struct EgernRuleSet {
    no_resolve: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_suffix_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_wildcard_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_regex_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domain_keyword_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ip_cidr_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ip_cidr6_set: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    asn_set: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    url_regex_set: Vec<String>,
}

impl EgernRuleSet {
    fn total(&self) -> usize {
        self.domain_set.len()
            + self.domain_suffix_set.len()
            + self.domain_wildcard_set.len()
            + self.domain_regex_set.len()
            + self.domain_keyword_set.len()
            + self.ip_cidr_set.len()
            + self.ip_cidr6_set.len()
            + self.asn_set.len()
            + self.url_regex_set.len()
    }
}

/// Render an Egern rule set, or `None` when it would hold no rules.
pub fn serialize(
    model: &SerializableRuleModel,
    options: &SerializationOptions,
) -> Result<Option<String>> {
    let mut domain_regex_set = model.domain_regex.clone();
    for tree in &model.logical {
        match to_domain_regex(tree) {
            Ok(pattern) => domain_regex_set.push(pattern),
            Err(e) => log::error!("rule: '{}', err: {}", tree, e),
        }
    }

    let rule_set = EgernRuleSet {
        no_resolve: options.no_resolve,
        domain_set: model.domain.clone(),
        domain_suffix_set: model.domain_suffix.clone(),
        domain_wildcard_set: model.domain_wildcard.clone(),
        domain_regex_set,
        domain_keyword_set: model.domain_keyword.clone(),
        ip_cidr_set: model.ip_cidr.iter().map(|n| n.to_string()).collect(),
        ip_cidr6_set: model.ip_cidr6.iter().map(|n| n.to_string()).collect(),
        asn_set: model.ip_asn.clone(),
        url_regex_set: model.url_regex.clone(),
    };

    let total = rule_set.total();
    if total == 0 {
        return Ok(None);
    }
    let body = serde_yaml::to_string(&rule_set)?;
    Ok(Some(format!("# Total: {} rules\n{}", total, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical::LogicalTree;
    use serde_yaml::Value;

    #[test]
    fn test_egern_document() {
        let model = SerializableRuleModel {
            domain_suffix: vec!["example.com".to_string()],
            ip_asn: vec![13335],
            ua: vec!["curl*".to_string()],
            logical: vec![
                LogicalTree::parse("AND,((DOMAIN-SUFFIX,a.com),(NOT,((DOMAIN,x.a.com))))").unwrap(),
                LogicalTree::parse("AND,((DOMAIN,b.com),(PROTOCOL,UDP))").unwrap(),
            ],
            ..Default::default()
        };
        let content = serialize(&model, &SerializationOptions::default())
            .unwrap()
            .unwrap();
        assert!(content.starts_with("# Total: 3 rules\n"));

        let doc: Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(doc["no_resolve"], Value::Bool(true));
        assert_eq!(doc["domain_suffix_set"][0], Value::from("example.com"));
        assert_eq!(doc["asn_set"][0].as_u64(), Some(13335));
        assert_eq!(
            doc["domain_regex_set"][0],
            Value::from(r"^(?=(?:[\w.-]+\.)?a\.com$)(?!x\.a\.com$)")
        );
        assert!(doc.get("domain_set").is_none());
        assert!(doc.get("ip_cidr_set").is_none());
    }

    #[test]
    fn test_egern_url_regex_set() {
        let model = SerializableRuleModel {
            url_regex: vec![r"^https?://a\.com/ads".to_string()],
            ..Default::default()
        };
        let content = serialize(&model, &SerializationOptions::default())
            .unwrap()
            .unwrap();
        assert!(content.starts_with("# Total: 1 rules\n"));
        let doc: Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(doc["url_regex_set"][0], Value::from(r"^https?://a\.com/ads"));
    }

    #[test]
    fn test_egern_empty() {
        let model = SerializableRuleModel {
            ua: vec!["curl*".to_string()],
            ..Default::default()
        };
        assert_eq!(
            serialize(&model, &SerializationOptions::default()).unwrap(),
            None
        );
    }
}
