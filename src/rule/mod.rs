//! Rule values and line parsing.
//!
//! A [`Rule`] is one validated entry on its way into a [`RuleSet`](crate::RuleSet).
//! Plain rules come from `TYPE,value[,attr...]` lines; logical rules are
//! handed to the logical expression parser.

pub mod validate;
pub mod wildcard;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;

use crate::error::{Error, Result, ValidationError};
use crate::logical::LogicalTree;
use crate::rule_type::{LogicalOperator, RuleType};

pub use validate::{
    is_valid_domain, parse_asn, parse_cidr, validate_domain, validate_regex, validate_wildcard,
};
pub use wildcard::regex_to_wildcards;

/// A single validated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Domain(String),
    DomainSuffix(String),
    DomainKeyword(String),
    DomainWildcard(String),
    DomainRegex(String),
    UrlRegex(String),
    IpCidr(Ipv4Net),
    IpCidr6(Ipv6Net),
    IpAsn(u32),
    UserAgent(String),
    ProcessName(String),
    Logical(LogicalTree),
}

impl Rule {
    /// Parse a `TYPE,value` line or a logical `AND/OR/NOT` expression.
    ///
    /// Trailing attributes such as `no-resolve` are ignored. `IP-CIDR` and
    /// `IP-CIDR6` are routed by the address family of the value.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(',') {
            Some((head, rest)) => (head.trim(), rest),
            None => return Err(ValidationError::MissingValue(line.to_string()).into()),
        };

        if LogicalOperator::parse(head).is_some() {
            return Ok(Rule::Logical(LogicalTree::parse(line)?));
        }

        let rule_type = RuleType::parse(head)
            .ok_or_else(|| ValidationError::UnsupportedRuleType(head.to_string()))?;
        let value = rest.split(',').next().unwrap_or_default().trim();
        if value.is_empty() {
            return Err(ValidationError::MissingValue(line.to_string()).into());
        }
        Self::from_parts(rule_type, value)
    }

    /// Build a rule from an already split type and value.
    pub fn from_parts(rule_type: RuleType, value: &str) -> Result<Self> {
        let rule = match rule_type {
            RuleType::Domain => Rule::Domain(validate_domain(value)?),
            RuleType::DomainSuffix => {
                Rule::DomainSuffix(validate_domain(value.trim().trim_start_matches('.'))?)
            }
            RuleType::DomainKeyword => Rule::DomainKeyword(non_empty(value, "keyword")?),
            RuleType::DomainWildcard => Rule::DomainWildcard(validate_wildcard(value)?),
            RuleType::DomainRegex => Rule::DomainRegex(validate_regex(value)?),
            RuleType::UrlRegex => Rule::UrlRegex(validate_regex(value)?),
            RuleType::IpCidr | RuleType::IpCidr6 => match parse_cidr(value)? {
                IpNet::V4(net) => Rule::IpCidr(net),
                IpNet::V6(net) => Rule::IpCidr6(net),
            },
            RuleType::IpAsn => Rule::IpAsn(parse_asn(value)?),
            RuleType::UserAgent => Rule::UserAgent(non_empty(value, "user agent")?),
            RuleType::ProcessName => Rule::ProcessName(non_empty(value, "process name")?),
            other => {
                return Err(Error::Validation(ValidationError::UnsupportedRuleType(
                    other.as_str().to_string(),
                )))
            }
        };
        Ok(rule)
    }

    /// Get the rule type this entry is emitted as.
    pub fn rule_type(&self) -> Option<RuleType> {
        match self {
            Rule::Domain(_) => Some(RuleType::Domain),
            Rule::DomainSuffix(_) => Some(RuleType::DomainSuffix),
            Rule::DomainKeyword(_) => Some(RuleType::DomainKeyword),
            Rule::DomainWildcard(_) => Some(RuleType::DomainWildcard),
            Rule::DomainRegex(_) => Some(RuleType::DomainRegex),
            Rule::UrlRegex(_) => Some(RuleType::UrlRegex),
            Rule::IpCidr(_) => Some(RuleType::IpCidr),
            Rule::IpCidr6(_) => Some(RuleType::IpCidr6),
            Rule::IpAsn(_) => Some(RuleType::IpAsn),
            Rule::UserAgent(_) => Some(RuleType::UserAgent),
            Rule::ProcessName(_) => Some(RuleType::ProcessName),
            Rule::Logical(_) => None,
        }
    }
}

impl From<IpNet> for Rule {
    fn from(net: IpNet) -> Self {
        match net.trunc() {
            IpNet::V4(net) => Rule::IpCidr(net),
            IpNet::V6(net) => Rule::IpCidr6(net),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Domain(v)
            | Rule::DomainSuffix(v)
            | Rule::DomainKeyword(v)
            | Rule::DomainWildcard(v)
            | Rule::DomainRegex(v)
            | Rule::UrlRegex(v)
            | Rule::UserAgent(v)
            | Rule::ProcessName(v) => {
                write!(f, "{},{}", self.rule_type().map_or("", |t| t.as_str()), v)
            }
            Rule::IpCidr(net) => write!(f, "IP-CIDR,{}", net),
            Rule::IpCidr6(net) => write!(f, "IP-CIDR6,{}", net),
            Rule::IpAsn(asn) => write!(f, "IP-ASN,{}", asn),
            Rule::Logical(tree) => write!(f, "{}", tree.canonical()),
        }
    }
}

fn non_empty(value: &str, what: &'static str) -> std::result::Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(what));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_lines() {
        assert_eq!(
            Rule::parse_line("DOMAIN,Example.com").unwrap(),
            Rule::Domain("example.com".to_string())
        );
        assert_eq!(
            Rule::parse_line("DOMAIN-SUFFIX,.google.com").unwrap(),
            Rule::DomainSuffix("google.com".to_string())
        );
        assert_eq!(
            Rule::parse_line("IP-CIDR,10.1.0.0/8,no-resolve").unwrap(),
            Rule::IpCidr("10.0.0.0/8".parse().unwrap())
        );
        assert_eq!(
            Rule::parse_line("IP-CIDR,2001:db8::/32").unwrap(),
            Rule::IpCidr6("2001:db8::/32".parse().unwrap())
        );
        assert_eq!(Rule::parse_line("IP-ASN,AS13335").unwrap(), Rule::IpAsn(13335));
        assert_eq!(
            Rule::parse_line("PROCESS-NAME,curl").unwrap(),
            Rule::ProcessName("curl".to_string())
        );
        let url = Rule::parse_line(r"URL-REGEX,^https?://ad\.example\.com/").unwrap();
        assert_eq!(url, Rule::UrlRegex(r"^https?://ad\.example\.com/".to_string()));
        assert_eq!(url.to_string(), r"URL-REGEX,^https?://ad\.example\.com/");
    }

    #[test]
    fn test_parse_logical_line() {
        let rule = Rule::parse_line("AND,((DOMAIN,a.com),(PROTOCOL,UDP))").unwrap();
        assert!(matches!(rule, Rule::Logical(_)));
        assert_eq!(rule.to_string(), "AND,((DOMAIN,a.com),(PROTOCOL,UDP))");
        assert_eq!(rule.rule_type(), None);
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!(
            Rule::parse_line("DOMAIN"),
            Err(Error::Validation(ValidationError::MissingValue(_)))
        ));
        assert!(matches!(
            Rule::parse_line("FINAL,DIRECT"),
            Err(Error::Validation(ValidationError::UnsupportedRuleType(_)))
        ));
        assert!(matches!(
            Rule::parse_line("GEOIP,CN"),
            Err(Error::Validation(ValidationError::UnsupportedRuleType(_)))
        ));
        assert!(matches!(
            Rule::parse_line("DOMAIN,bad..domain"),
            Err(Error::Validation(ValidationError::InvalidDomain(_)))
        ));
        assert!(matches!(
            Rule::parse_line("NOT,((DOMAIN,a.com),(DOMAIN,b.com))"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_display() {
        let rule = Rule::from_parts(RuleType::DomainKeyword, "ads").unwrap();
        assert_eq!(rule.to_string(), "DOMAIN-KEYWORD,ads");
        let rule = Rule::from("192.168.1.7/24".parse::<IpNet>().unwrap());
        assert_eq!(rule.to_string(), "IP-CIDR,192.168.1.0/24");
    }
}
