//! Clash rule-provider payloads.

use serde::Serialize;

use crate::converter::ClashBehavior;
use crate::logical::ClashDialect;
use crate::ruleset::{SerializableRuleModel, SerializationOptions};
use crate::Result;

use super::logical_lines;

/// Above this many rules a mixed set is split into a `domain` payload plus a
/// `classical` payload for the rest.
pub const SPLIT_THRESHOLD: usize = 10_000;

/// One rendered provider file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClashPayload {
    pub behavior: ClashBehavior,
    pub content: String,
}

#[derive(Serialize)]
struct Payload<'a> {
    payload: &'a [String],
}

fn render(behavior: ClashBehavior, payload: &[String]) -> Result<ClashPayload> {
    Ok(ClashPayload {
        behavior,
        content: serde_yaml::to_string(&Payload { payload })?,
    })
}

fn domain_payload(model: &SerializableRuleModel) -> Vec<String> {
    let mut payload = Vec::with_capacity(
        model.domain.len() + model.domain_suffix.len() + model.domain_wildcard.len(),
    );
    payload.extend(model.domain.iter().cloned());
    payload.extend(model.domain_suffix.iter().map(|d| format!("+.{}", d)));
    payload.extend(model.domain_wildcard.iter().cloned());
    payload
}

fn ipcidr_payload(model: &SerializableRuleModel) -> Vec<String> {
    model
        .ip_cidr
        .iter()
        .map(|n| n.to_string())
        .chain(model.ip_cidr6.iter().map(|n| n.to_string()))
        .collect()
}

fn classical_payload(
    model: &SerializableRuleModel,
    options: &SerializationOptions,
    logical: &[String],
    skip_domain: bool,
) -> Vec<String> {
    let suffix = if options.no_resolve { ",no-resolve" } else { "" };
    let mut payload = Vec::with_capacity(model.count_rules());
    if !skip_domain {
        payload.extend(model.domain.iter().map(|d| format!("DOMAIN,{}", d)));
        payload.extend(model.domain_suffix.iter().map(|d| format!("DOMAIN-SUFFIX,{}", d)));
        payload.extend(model.domain_wildcard.iter().map(|w| format!("DOMAIN-WILDCARD,{}", w)));
    }
    payload.extend(model.domain_keyword.iter().map(|k| format!("DOMAIN-KEYWORD,{}", k)));
    payload.extend(model.domain_regex.iter().map(|r| format!("DOMAIN-REGEX,{}", r)));
    payload.extend(model.ip_cidr.iter().map(|n| format!("IP-CIDR,{}{}", n, suffix)));
    payload.extend(model.ip_cidr6.iter().map(|n| format!("IP-CIDR6,{}{}", n, suffix)));
    payload.extend(model.ip_asn.iter().map(|a| format!("IP-ASN,{}{}", a, suffix)));
    payload.extend(model.process.iter().map(|p| format!("PROCESS-NAME,{}", p)));
    payload.extend(logical.iter().cloned());
    payload
}

/// Render provider payloads. User agents have no Clash equivalent and are skipped.
pub fn serialize(
    model: &SerializableRuleModel,
    options: &SerializationOptions,
) -> Result<Vec<ClashPayload>> {
    let logical = logical_lines(&model.logical, &ClashDialect);

    if options.clash_optimize {
        if logical.is_empty() {
            if model.has_only_plain_domain_rules() {
                return Ok(vec![render(ClashBehavior::Domain, &domain_payload(model))?]);
            }
            if model.has_only_ip_cidr_rules() {
                return Ok(vec![render(ClashBehavior::IpCidr, &ipcidr_payload(model))?]);
            }
        }

        let total = model.count_rules() - model.ua.len() - model.logical.len() + logical.len();
        if total > SPLIT_THRESHOLD {
            let domains = domain_payload(model);
            let rest = classical_payload(model, options, &logical, true);
            let mut payloads = Vec::with_capacity(2);
            if !domains.is_empty() {
                payloads.push(render(ClashBehavior::Domain, &domains)?);
            }
            if !rest.is_empty() {
                payloads.push(render(ClashBehavior::Classical, &rest)?);
            }
            return Ok(payloads);
        }
    }

    let payload = classical_payload(model, options, &logical, false);
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![render(ClashBehavior::Classical, &payload)?])
}
