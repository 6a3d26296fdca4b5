//! Surge rule-set and domain-set text readers.

use crate::rule::{validate_domain, Rule};
use crate::ruleset::RuleSet;

/// Lines containing any of these are generator watermarks, not rules.
const DEFAULT_MARKERS: [&str; 3] = [
    "this_ruleset_is_made_by_sukkaw.ruleset.skk.moe",
    "this_rule_set_is_made_by_sukkaw.skk.moe",
    "acl4.ssr",
];

/// Strip `#`, `;` and `//` comments. `//` right after `:` is part of a URL.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut end = line.len();
    for (i, &b) in bytes.iter().enumerate() {
        let is_comment = match b {
            b'#' | b';' => true,
            b'/' => bytes.get(i + 1) == Some(&b'/') && (i == 0 || bytes[i - 1] != b':'),
            _ => false,
        };
        if is_comment {
            end = i;
            break;
        }
    }
    line[..end].trim()
}

/// Reader for Surge-style rule text.
#[derive(Debug, Clone)]
pub struct SurgeParser {
    markers: Vec<String>,
}

impl SurgeParser {
    /// Create a parser with the default watermark markers.
    pub fn new() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Skip lines containing `marker` as well.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    fn lines<'a>(&'a self, content: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        content
            .lines()
            .map(strip_comment)
            .filter(|line| !line.is_empty())
            .filter(move |line| !self.markers.iter().any(|m| line.contains(m.as_str())))
    }

    /// Parse `TYPE,value` lines and logical expressions.
    ///
    /// Invalid lines are logged and skipped.
    pub fn parse_rule_set(&self, content: &str) -> RuleSet {
        let mut set = RuleSet::new();
        for line in self.lines(content) {
            match Rule::parse_line(line) {
                Ok(rule) => {
                    set.insert(rule);
                }
                Err(crate::Error::Parse(e)) => log::error!("{}: '{}'", e, line),
                Err(e) => log::warn!("Skipping '{}': {}", line, e),
            }
        }
        set
    }

    /// Parse a domain set: one host per line, a leading `.` marks a suffix.
    pub fn parse_domain_set(&self, content: &str) -> RuleSet {
        let mut set = RuleSet::new();
        for line in self.lines(content) {
            let (suffix, domain) = match line.strip_prefix('.') {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            match validate_domain(domain) {
                Ok(domain) if suffix => {
                    set.insert(Rule::DomainSuffix(domain));
                }
                Ok(domain) => {
                    set.insert(Rule::Domain(domain));
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        set
    }
}

impl Default for SurgeParser {
    fn default() -> Self {
        Self::new()
    }
}
