//! Flattened, ordered snapshot of a rule set.

use ipnet::{Ipv4Net, Ipv6Net};

use crate::logical::LogicalTree;

/// Plain lists consumed by the client serializers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializableRuleModel {
    pub domain: Vec<String>,
    pub domain_suffix: Vec<String>,
    pub domain_wildcard: Vec<String>,
    pub domain_regex: Vec<String>,
    pub domain_keyword: Vec<String>,
    pub url_regex: Vec<String>,
    pub ip_cidr: Vec<Ipv4Net>,
    pub ip_cidr6: Vec<Ipv6Net>,
    pub ip_asn: Vec<u32>,
    pub process: Vec<String>,
    pub ua: Vec<String>,
    pub logical: Vec<LogicalTree>,
}

impl SerializableRuleModel {
    /// Total number of rules across all lists.
    pub fn count_rules(&self) -> usize {
        self.domain.len()
            + self.domain_suffix.len()
            + self.domain_wildcard.len()
            + self.domain_regex.len()
            + self.domain_keyword.len()
            + self.url_regex.len()
            + self.ip_cidr.len()
            + self.ip_cidr6.len()
            + self.ip_asn.len()
            + self.process.len()
            + self.ua.len()
            + self.logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count_rules() == 0
    }

    fn has_non_domain_rules(&self) -> bool {
        !self.ip_cidr.is_empty()
            || !self.ip_cidr6.is_empty()
            || !self.ip_asn.is_empty()
            || !self.process.is_empty()
            || !self.url_regex.is_empty()
            || !self.logical.is_empty()
    }

    /// Only `DOMAIN`, `DOMAIN-SUFFIX` and `DOMAIN-WILDCARD` entries (user agents ignored).
    pub fn has_only_plain_domain_rules(&self) -> bool {
        let has_domains = !self.domain.is_empty()
            || !self.domain_suffix.is_empty()
            || !self.domain_wildcard.is_empty();
        has_domains
            && self.domain_keyword.is_empty()
            && self.domain_regex.is_empty()
            && !self.has_non_domain_rules()
    }

    /// Only `IP-CIDR` and `IP-CIDR6` entries (user agents ignored).
    pub fn has_only_ip_cidr_rules(&self) -> bool {
        (!self.ip_cidr.is_empty() || !self.ip_cidr6.is_empty())
            && self.domain.is_empty()
            && self.domain_suffix.is_empty()
            && self.domain_wildcard.is_empty()
            && self.domain_regex.is_empty()
            && self.domain_keyword.is_empty()
            && self.ip_asn.is_empty()
            && self.process.is_empty()
            && self.url_regex.is_empty()
            && self.logical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let mut model = SerializableRuleModel::default();
        assert!(model.is_empty());
        assert!(!model.has_only_plain_domain_rules());

        model.domain_suffix.push("example.com".to_string());
        model.ua.push("curl*".to_string());
        assert!(model.has_only_plain_domain_rules());
        assert!(!model.has_only_ip_cidr_rules());

        model.ip_cidr.push("10.0.0.0/8".parse().unwrap());
        assert!(!model.has_only_plain_domain_rules());
        assert!(!model.has_only_ip_cidr_rules());

        model.domain_suffix.clear();
        assert!(model.has_only_ip_cidr_rules());
        assert_eq!(model.count_rules(), 2);

        model.url_regex.push(r"^https?://ads\.".to_string());
        assert!(!model.has_only_ip_cidr_rules());
        assert_eq!(model.count_rules(), 3);
    }
}
