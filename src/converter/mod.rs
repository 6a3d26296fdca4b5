//! Format converters for rule sources.

mod clash;
mod surge;
mod v2ray;

pub use clash::{ClashBehavior, ClashConverter};
pub use surge::{strip_comment, SurgeParser};
pub use v2ray::{parse_domain_list, V2rayDomainList};

use std::fmt;

use crate::ruleset::{Options, RuleSet};
use crate::Result;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    SurgeRuleSet,
    SurgeDomainSet,
    V2rayDomain,
    ClashProvider(ClashBehavior),
}

impl InputFormat {
    /// Parse a format name such as `surge`, `domain-set`, `v2ray` or `clash-classical`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "surge" | "rule-set" | "ruleset" => Some(InputFormat::SurgeRuleSet),
            "domain-set" | "domainset" => Some(InputFormat::SurgeDomainSet),
            "v2ray" | "v2ray-domain" => Some(InputFormat::V2rayDomain),
            other => other
                .strip_prefix("clash-")
                .and_then(ClashBehavior::parse)
                .map(InputFormat::ClashProvider),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::SurgeRuleSet => f.write_str("surge"),
            InputFormat::SurgeDomainSet => f.write_str("domain-set"),
            InputFormat::V2rayDomain => f.write_str("v2ray"),
            InputFormat::ClashProvider(behavior) => write!(f, "clash-{}", behavior),
        }
    }
}

/// Convert source text into a rule set.
///
/// V2Ray `include:` targets are logged; resolving them is up to the caller
/// (see [`parse_domain_list`]).
pub fn convert(format: InputFormat, content: &str, options: &Options) -> Result<RuleSet> {
    let set = match format {
        InputFormat::SurgeRuleSet => SurgeParser::new().parse_rule_set(content),
        InputFormat::SurgeDomainSet => SurgeParser::new().parse_domain_set(content),
        InputFormat::V2rayDomain => {
            let list = parse_domain_list(content, &options.v2ray_domain);
            for include in &list.includes {
                log::info!("V2Ray list references include:{}", include);
            }
            list.rules
        }
        InputFormat::ClashProvider(behavior) => {
            ClashConverter::new(behavior).load_provider(content)?
        }
    };
    log::debug!("Converted {} source into {} rules", format, set.len());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_parse() {
        assert_eq!(InputFormat::parse("surge"), Some(InputFormat::SurgeRuleSet));
        assert_eq!(InputFormat::parse("Domain-Set"), Some(InputFormat::SurgeDomainSet));
        assert_eq!(
            InputFormat::parse("clash-ipcidr"),
            Some(InputFormat::ClashProvider(ClashBehavior::IpCidr))
        );
        assert_eq!(InputFormat::parse("clash-rule"), None);
        assert_eq!(InputFormat::parse("geoip"), None);
    }

    #[test]
    fn test_format_names_parse_back() {
        let formats = [
            InputFormat::SurgeRuleSet,
            InputFormat::SurgeDomainSet,
            InputFormat::V2rayDomain,
            InputFormat::ClashProvider(ClashBehavior::Domain),
            InputFormat::ClashProvider(ClashBehavior::Classical),
        ];
        for format in formats {
            assert_eq!(InputFormat::parse(&format.to_string()), Some(format));
        }
    }

    #[test]
    fn test_convert_dispatch() {
        let options = Options::default();
        let set = convert(InputFormat::V2rayDomain, "full:a.com\ninclude:b", &options).unwrap();
        assert_eq!(set.to_model().domain, vec!["a.com"]);

        let err = convert(
            InputFormat::ClashProvider(ClashBehavior::Domain),
            "payload: [unclosed",
            &options,
        );
        assert!(matches!(err, Err(crate::Error::Yaml(_))));
    }
}
