//! Loon rule list.

use crate::logical::LoonDialect;
use crate::ruleset::{SerializableRuleModel, SerializationOptions};

use super::{logical_lines, with_total_header};

/// Render a Loon rule list. Loon has no wildcard, domain regex or process rules.
pub fn serialize(model: &SerializableRuleModel, _options: &SerializationOptions) -> Option<String> {
    let mut rules = Vec::with_capacity(model.count_rules());
    rules.extend(model.domain.iter().map(|d| format!("DOMAIN,{}", d)));
    rules.extend(model.domain_suffix.iter().map(|d| format!("DOMAIN-SUFFIX,{}", d)));
    rules.extend(model.domain_keyword.iter().map(|k| format!("DOMAIN-KEYWORD,{}", k)));
    rules.extend(model.ip_cidr.iter().map(|n| format!("IP-CIDR,{}", n)));
    rules.extend(model.ip_cidr6.iter().map(|n| format!("IP-CIDR6,{}", n)));
    rules.extend(model.ip_asn.iter().map(|a| format!("IP-ASN,{}", a)));
    rules.extend(model.ua.iter().map(|ua| format!("USER-AGENT,{}", ua)));
    rules.extend(logical_lines(&model.logical, &LoonDialect));
    rules.extend(model.url_regex.iter().map(|r| format!("URL-REGEX,{}", r)));
    with_total_header(&rules)
}
