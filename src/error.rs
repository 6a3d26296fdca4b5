//! Error types for rulesmith.

use thiserror::Error;

/// Error type for rulesmith operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or emitting error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON emitting error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed logical expression
    #[error(transparent)]
    Parse(#[from] LogicalParseError),

    /// Logical rule not expressible for a client
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Malformed domain, CIDR or ASN literal
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Keyword automaton could not be built
    #[error("keyword index error: {0}")]
    KeywordIndex(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for rulesmith operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced while parsing a logical expression such as
/// `AND,((DOMAIN,example.com),(PROTOCOL,UDP))`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicalParseError {
    /// Nothing to parse
    #[error("empty logical expression")]
    Empty,

    /// Parentheses do not balance
    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),

    /// Head token is not AND, OR or NOT
    #[error("'{0}' is not a valid logical operator, expected AND, OR or NOT")]
    UnknownOperator(String),

    /// A bare rule was given where an operator is required
    #[error("top-level expression must be AND, OR or NOT, found rule '{0}'")]
    BareRule(String),

    /// NOT with anything but one operand
    #[error("NOT rule must have exactly one sub-rule, found {0}")]
    NotArity(usize),

    /// AND/OR with fewer than two operands
    #[error("{operator} rule must have at least two sub-rules, found {found}")]
    AndOrArity {
        operator: &'static str,
        found: usize,
    },

    /// Operand that is neither an operator nor a `TYPE,value` pair
    #[error("invalid rule format: '{0}'")]
    InvalidRule(String),

    /// Leaf type outside the known vocabulary
    #[error("unknown rule type '{0}'")]
    UnknownRuleType(String),

    /// Operators nested deeper than the limit
    #[error("logical rule nested deeper than {0} operators")]
    TooDeep(usize),
}

/// Error produced while rendering a logical tree for a specific client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// Leaf type the client has no syntax for
    #[error("{client}: unsupported rule type {rule_type} at {path}")]
    UnsupportedRuleType {
        client: &'static str,
        rule_type: &'static str,
        path: String,
    },

    /// Leaf type is known to the client but the value is not
    #[error("{client}: unsupported value '{value}' for {rule_type} at {path}")]
    UnsupportedValue {
        client: &'static str,
        rule_type: &'static str,
        value: String,
        path: String,
    },

    /// Operator node with the wrong number of children
    #[error("{operator} node at {path} has {found} children")]
    InvalidArity {
        operator: &'static str,
        found: usize,
        path: String,
    },
}

/// Error produced when a plain rule literal is rejected before insertion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty value
    #[error("empty {0} value")]
    Empty(&'static str),

    /// Domain with invalid labels
    #[error("invalid domain: '{0}'")]
    InvalidDomain(String),

    /// Regex with unbalanced groups, classes or a dangling escape
    #[error("invalid regex: '{0}'")]
    InvalidRegex(String),

    /// CIDR that is neither IPv4 nor IPv6
    #[error("invalid CIDR: '{0}'")]
    InvalidCidr(String),

    /// ASN that is not a 32-bit number
    #[error("invalid ASN: '{0}'")]
    InvalidAsn(String),

    /// Rule line with an unknown type
    #[error("unsupported rule type: '{0}'")]
    UnsupportedRuleType(String),

    /// Rule line without a value
    #[error("missing value in rule line: '{0}'")]
    MissingValue(String),
}
