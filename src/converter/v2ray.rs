//! V2Ray `domain-list-community` text reader.
//!
//! ```text
//! # comment
//! include:google-ads
//! example.com              # suffix, prefix omitted
//! domain:example.org @cn   # suffix with an attribute
//! full:www.example.net     # exact
//! keyword:tracker
//! regexp:^ad\d+\.example\.com$
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rule::{validate_domain, validate_regex, Rule};
use crate::ruleset::{RuleSet, V2rayDomainOptions};

static EXPLICIT_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(domain|keyword|full|regexp):(.+?)(?:\s+(@\w+(?:\s+@\w+)*))?$").unwrap()
});

/// Parsed list plus the `include:` targets it references.
#[derive(Debug, Clone, Default)]
pub struct V2rayDomainList {
    pub rules: RuleSet,
    pub includes: Vec<String>,
}

/// Parse a V2Ray domain list, applying the attribute filter.
pub fn parse_domain_list(content: &str, options: &V2rayDomainOptions) -> V2rayDomainList {
    let mut list = V2rayDomainList::default();

    for line in content.lines() {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(target) = line.strip_prefix("include:") {
            let target = target.split_whitespace().next().unwrap_or_default();
            if target.is_empty() || options.exclude_includes.iter().any(|e| e == target) {
                continue;
            }
            list.includes.push(target.to_string());
            continue;
        }

        let (kind, value, attrs): (&str, &str, Vec<String>) = match EXPLICIT_RULE.captures(line) {
            Some(caps) => (
                caps.get(1).map_or("domain", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str().trim()),
                caps.get(3)
                    .map(|m| m.as_str().split_whitespace().map(String::from).collect())
                    .unwrap_or_default(),
            ),
            None => {
                let mut parts = line.split_whitespace();
                let value = parts.next().unwrap_or_default();
                ("domain", value, parts.map(String::from).collect())
            }
        };

        if !options.attrs.accepts(&attrs) {
            continue;
        }

        let rule = match kind {
            "full" => validate_domain(value).map(Rule::Domain),
            "keyword" => Ok(Rule::DomainKeyword(value.to_string())),
            "regexp" => validate_regex(value).map(Rule::DomainRegex),
            _ => validate_domain(value).map(Rule::DomainSuffix),
        };
        match rule {
            Ok(rule) => {
                list.rules.insert(rule);
            }
            Err(e) => log::warn!("Skipping V2Ray entry '{}': {}", line, e),
        }
    }

    list
}
