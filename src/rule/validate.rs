//! Literal validation for domains, wildcards, CIDRs and ASNs.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

use crate::error::ValidationError;

static DOMAIN_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?$").unwrap());

static WILDCARD_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_*?-]{1,63}$").unwrap());

const MAX_DOMAIN_LEN: usize = 253;

/// Check whether `domain` is a syntactically valid host name.
///
/// Single-label names such as `localhost` are accepted.
pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.len() <= MAX_DOMAIN_LEN
        && domain.split('.').all(|label| DOMAIN_LABEL.is_match(label))
}

/// Normalize and validate a domain: trims, lowercases and drops a trailing dot.
pub fn validate_domain(domain: &str) -> Result<String, ValidationError> {
    let normalized = normalize(domain);
    if normalized.is_empty() {
        return Err(ValidationError::Empty("domain"));
    }
    if !is_valid_domain(&normalized) {
        return Err(ValidationError::InvalidDomain(domain.trim().to_string()));
    }
    Ok(normalized)
}

/// Normalize and validate a wildcard pattern, allowing `*` and `?` in labels.
pub fn validate_wildcard(pattern: &str) -> Result<String, ValidationError> {
    let normalized = normalize(pattern);
    if normalized.is_empty() {
        return Err(ValidationError::Empty("wildcard"));
    }
    let valid = normalized.len() <= MAX_DOMAIN_LEN
        && normalized
            .split('.')
            .all(|label| WILDCARD_LABEL.is_match(label));
    if !valid {
        return Err(ValidationError::InvalidDomain(pattern.trim().to_string()));
    }
    Ok(normalized)
}

/// Validate a domain or URL regex.
///
/// Patterns are passed through to clients whose engines support lookaround
/// and backreferences, so only the structure is checked: groups and classes
/// must be closed and the pattern must not end in a lone backslash.
pub fn validate_regex(pattern: &str) -> Result<String, ValidationError> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(ValidationError::Empty("regex"));
    }
    if !is_balanced_regex(pattern) {
        return Err(ValidationError::InvalidRegex(pattern.to_string()));
    }
    Ok(pattern.to_string())
}

fn is_balanced_regex(pattern: &str) -> bool {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            // `]` right after `[` or `[^` is a literal
            '[' if !in_class => {
                in_class = true;
                chars.next_if_eq(&'^');
                chars.next_if_eq(&']');
            }
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0 && !in_class
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Parse a CIDR string, truncating host bits.
///
/// A bare address is accepted as a host prefix (`/32` or `/128`).
pub fn parse_cidr(cidr: &str) -> Result<IpNet, ValidationError> {
    let cidr = cidr.trim();
    if cidr.is_empty() {
        return Err(ValidationError::Empty("CIDR"));
    }
    if let Ok(net) = cidr.parse::<IpNet>() {
        return Ok(net.trunc());
    }
    match cidr.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => Ok(IpNet::V4(Ipv4Net::from(addr))),
        Ok(IpAddr::V6(addr)) => Ok(IpNet::V6(Ipv6Net::from(addr))),
        Err(_) => Err(ValidationError::InvalidCidr(cidr.to_string())),
    }
}

/// Parse an ASN, with or without the `AS` prefix.
pub fn parse_asn(asn: &str) -> Result<u32, ValidationError> {
    let trimmed = asn.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("ASN"));
    }
    let digits = trimmed
        .strip_prefix("AS")
        .or_else(|| trimmed.strip_prefix("as"))
        .unwrap_or(trimmed);
    digits
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidAsn(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("a-b.example.co.uk"));
        assert!(is_valid_domain("_dmarc.example.com"));
        assert!(is_valid_domain("localhost"));
    }

    #[test]
    fn test_invalid_domains() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("-bad.example.com"));
        assert!(!is_valid_domain("bad-.example.com"));
        assert!(!is_valid_domain("exa mple.com"));
        assert!(!is_valid_domain("example..com"));
        assert!(!is_valid_domain(&format!("{}.com", "a".repeat(64))));
        assert!(!is_valid_domain(&["a"; 130].join(".")));
    }

    #[test]
    fn test_validate_domain_normalizes() {
        assert_eq!(validate_domain(" Example.COM. ").unwrap(), "example.com");
        assert_eq!(
            validate_domain("  "),
            Err(ValidationError::Empty("domain"))
        );
        assert!(matches!(
            validate_domain("http://example.com"),
            Err(ValidationError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_validate_wildcard() {
        assert_eq!(validate_wildcard("*.Example.com").unwrap(), "*.example.com");
        assert_eq!(validate_wildcard("ad?.example.com").unwrap(), "ad?.example.com");
        assert!(validate_wildcard("a/b.example.com").is_err());
    }

    #[test]
    fn test_validate_regex() {
        assert!(validate_regex(r"^ads\d+\.example\.com$").is_ok());
        assert!(validate_regex(r"^[]a-z]+\.com$").is_ok());
        assert!(validate_regex(r"^a[(]b\)\.com$").is_ok());
        assert_eq!(
            validate_regex("(unclosed"),
            Err(ValidationError::InvalidRegex("(unclosed".to_string()))
        );
        assert!(validate_regex("a)b").is_err());
        assert!(validate_regex("[a-z").is_err());
        assert!(validate_regex(r"trailing\").is_err());
    }

    #[test]
    fn test_validate_regex_keeps_client_syntax() {
        // lookaround and backreferences are valid for the clients that consume them
        assert_eq!(
            validate_regex(r" ^(?!www\.)ad\..* ").unwrap(),
            r"^(?!www\.)ad\..*"
        );
        assert!(validate_regex(r"^(?<=x)y$").is_ok());
        assert!(validate_regex(r"^(a)\1\.com$").is_ok());
    }

    #[test]
    fn test_parse_cidr() {
        assert_eq!(
            parse_cidr("10.1.2.3/8").unwrap(),
            "10.0.0.0/8".parse::<IpNet>().unwrap()
        );
        assert_eq!(
            parse_cidr("192.168.1.1").unwrap(),
            "192.168.1.1/32".parse::<IpNet>().unwrap()
        );
        assert_eq!(
            parse_cidr("2001:db8::1/32").unwrap(),
            "2001:db8::/32".parse::<IpNet>().unwrap()
        );
        assert!(parse_cidr("10.0.0.0/33").is_err());
        assert!(parse_cidr("not-an-ip").is_err());
    }

    #[test]
    fn test_parse_asn() {
        assert_eq!(parse_asn("13335"), Ok(13335));
        assert_eq!(parse_asn("AS4134"), Ok(4134));
        assert!(parse_asn("ASX").is_err());
        assert!(parse_asn("").is_err());
    }
}
