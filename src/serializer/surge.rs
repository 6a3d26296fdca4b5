//! Surge rule list.

use crate::logical::SurgeDialect;
use crate::rule::regex_to_wildcards;
use crate::ruleset::{SerializableRuleModel, SerializationOptions};

use super::{logical_lines, with_total_header};

/// Render a Surge `RULE-SET` list.
pub fn serialize(model: &SerializableRuleModel, options: &SerializationOptions) -> Option<String> {
    let suffix = if options.no_resolve { ",no-resolve" } else { "" };
    let mut rules = Vec::with_capacity(model.count_rules());

    rules.extend(model.domain.iter().map(|d| format!("DOMAIN,{}", d)));
    rules.extend(model.domain_suffix.iter().map(|d| format!("DOMAIN-SUFFIX,{}", d)));
    rules.extend(model.domain_keyword.iter().map(|k| format!("DOMAIN-KEYWORD,{}", k)));
    rules.extend(model.domain_wildcard.iter().map(|w| format!("DOMAIN-WILDCARD,{}", w)));
    rules.extend(model.ip_cidr.iter().map(|n| format!("IP-CIDR,{}{}", n, suffix)));
    rules.extend(model.ip_cidr6.iter().map(|n| format!("IP-CIDR6,{}{}", n, suffix)));
    rules.extend(model.ip_asn.iter().map(|a| format!("IP-ASN,{}{}", a, suffix)));
    rules.extend(model.ua.iter().map(|ua| format!("USER-AGENT,{}", ua)));
    rules.extend(model.process.iter().map(|p| format!("PROCESS-NAME,{}", p)));
    rules.extend(logical_lines(&model.logical, &SurgeDialect));
    rules.extend(model.url_regex.iter().map(|r| format!("URL-REGEX,{}", r)));

    // Surge has no DOMAIN-REGEX; approximate each pattern with wildcards
    for pattern in &model.domain_regex {
        let globs = regex_to_wildcards(pattern);
        if globs.is_empty() {
            log::debug!("surge: dropping DOMAIN-REGEX,{}", pattern);
        }
        for glob in globs {
            if !model.domain_wildcard.contains(&glob) {
                rules.push(format!("DOMAIN-WILDCARD,{}", glob));
            }
        }
    }

    with_total_header(&rules)
}
