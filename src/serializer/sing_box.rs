//! sing-box source rule-set JSON.

use serde_json::{json, Map, Value};

use crate::logical::to_sing_box;
use crate::ruleset::{SerializableRuleModel, SerializationOptions};
use crate::Result;

/// Source format version written to `version`.
pub const RULE_SET_VERSION: u8 = 1;

/// Render a sing-box rule set, or `None` when it would hold no rules.
pub fn serialize(
    model: &SerializableRuleModel,
    _options: &SerializationOptions,
) -> Result<Option<String>> {
    let mut head = Map::new();
    if !model.domain.is_empty() {
        head.insert("domain".to_string(), json!(model.domain));
    }
    if !model.domain_suffix.is_empty() {
        head.insert("domain_suffix".to_string(), json!(model.domain_suffix));
    }
    if !model.domain_keyword.is_empty() {
        head.insert("domain_keyword".to_string(), json!(model.domain_keyword));
    }
    if !model.domain_regex.is_empty() {
        head.insert("domain_regex".to_string(), json!(model.domain_regex));
    }
    let cidrs: Vec<String> = model
        .ip_cidr
        .iter()
        .map(|n| n.to_string())
        .chain(model.ip_cidr6.iter().map(|n| n.to_string()))
        .collect();
    if !cidrs.is_empty() {
        head.insert("ip_cidr".to_string(), json!(cidrs));
    }

    let mut rules = Vec::new();
    if !head.is_empty() {
        rules.push(Value::Object(head));
    }
    if !model.process.is_empty() {
        rules.push(json!({ "process_name": model.process }));
    }
    for tree in &model.logical {
        match to_sing_box(tree) {
            Ok(rule) => rules.push(rule),
            Err(e) => log::error!("rule: '{}', err: {}", tree, e),
        }
    }
    if !model.domain_wildcard.is_empty() {
        log::debug!(
            "sing-box: dropping {} DOMAIN-WILDCARD entries",
            model.domain_wildcard.len()
        );
    }

    if rules.is_empty() {
        return Ok(None);
    }
    let document = json!({ "version": RULE_SET_VERSION, "rules": rules });
    Ok(Some(serde_json::to_string(&document)?))
}
