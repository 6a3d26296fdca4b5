//! Rule type definitions.

use std::fmt;

/// RuleType is the closed vocabulary of leaf rule types.
///
/// Client serializers match on it exhaustively, so a new variant has to be
/// handled (or explicitly rejected) by every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleType {
    Domain,
    DomainSuffix,
    DomainKeyword,
    DomainWildcard,
    DomainRegex,
    IpCidr,
    IpCidr6,
    IpAsn,
    GeoIp,
    UserAgent,
    UrlRegex,
    ProcessName,
    SrcIp,
    SrcPort,
    InPort,
    DestPort,
    Protocol,
    HostnameType,
}

impl RuleType {
    /// Every rule type, in declaration order.
    pub const ALL: [RuleType; 18] = [
        RuleType::Domain,
        RuleType::DomainSuffix,
        RuleType::DomainKeyword,
        RuleType::DomainWildcard,
        RuleType::DomainRegex,
        RuleType::IpCidr,
        RuleType::IpCidr6,
        RuleType::IpAsn,
        RuleType::GeoIp,
        RuleType::UserAgent,
        RuleType::UrlRegex,
        RuleType::ProcessName,
        RuleType::SrcIp,
        RuleType::SrcPort,
        RuleType::InPort,
        RuleType::DestPort,
        RuleType::Protocol,
        RuleType::HostnameType,
    ];

    /// Parse a rule type from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DOMAIN" => Some(RuleType::Domain),
            "DOMAIN-SUFFIX" => Some(RuleType::DomainSuffix),
            "DOMAIN-KEYWORD" => Some(RuleType::DomainKeyword),
            "DOMAIN-WILDCARD" => Some(RuleType::DomainWildcard),
            "DOMAIN-REGEX" => Some(RuleType::DomainRegex),
            "IP-CIDR" => Some(RuleType::IpCidr),
            "IP-CIDR6" => Some(RuleType::IpCidr6),
            "IP-ASN" => Some(RuleType::IpAsn),
            "GEOIP" => Some(RuleType::GeoIp),
            "USER-AGENT" => Some(RuleType::UserAgent),
            "URL-REGEX" => Some(RuleType::UrlRegex),
            "PROCESS-NAME" => Some(RuleType::ProcessName),
            "SRC-IP" => Some(RuleType::SrcIp),
            "SRC-PORT" => Some(RuleType::SrcPort),
            "IN-PORT" => Some(RuleType::InPort),
            "DEST-PORT" | "DST-PORT" => Some(RuleType::DestPort),
            "PROTOCOL" => Some(RuleType::Protocol),
            "HOSTNAME-TYPE" => Some(RuleType::HostnameType),
            _ => None,
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Domain => "DOMAIN",
            RuleType::DomainSuffix => "DOMAIN-SUFFIX",
            RuleType::DomainKeyword => "DOMAIN-KEYWORD",
            RuleType::DomainWildcard => "DOMAIN-WILDCARD",
            RuleType::DomainRegex => "DOMAIN-REGEX",
            RuleType::IpCidr => "IP-CIDR",
            RuleType::IpCidr6 => "IP-CIDR6",
            RuleType::IpAsn => "IP-ASN",
            RuleType::GeoIp => "GEOIP",
            RuleType::UserAgent => "USER-AGENT",
            RuleType::UrlRegex => "URL-REGEX",
            RuleType::ProcessName => "PROCESS-NAME",
            RuleType::SrcIp => "SRC-IP",
            RuleType::SrcPort => "SRC-PORT",
            RuleType::InPort => "IN-PORT",
            RuleType::DestPort => "DEST-PORT",
            RuleType::Protocol => "PROTOCOL",
            RuleType::HostnameType => "HOSTNAME-TYPE",
        }
    }

    /// The domain entry kind this rule type is stored as, if any.
    pub fn domain_type(&self) -> Option<DomainType> {
        match self {
            RuleType::Domain => Some(DomainType::Domain),
            RuleType::DomainSuffix => Some(DomainType::DomainSuffix),
            RuleType::DomainWildcard => Some(DomainType::DomainWildcard),
            _ => None,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind discriminator of an entry in the domain trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainType {
    /// Exact host name
    Domain,
    /// The name itself and every subdomain
    DomainSuffix,
    /// Glob with `*` and `?`
    DomainWildcard,
}

impl DomainType {
    /// The rule type an entry of this kind is emitted as.
    pub fn rule_type(&self) -> RuleType {
        match self {
            DomainType::Domain => RuleType::Domain,
            DomainType::DomainSuffix => RuleType::DomainSuffix,
            DomainType::DomainWildcard => RuleType::DomainWildcard,
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule_type().as_str())
    }
}

/// Operator of a logical rule node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    /// Parse an operator name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Some(LogicalOperator::And),
            "OR" => Some(LogicalOperator::Or),
            "NOT" => Some(LogicalOperator::Not),
            _ => None,
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
