//! Translation of domain-only logical rules into a single anchored regex.
//!
//! Leaves become patterns matched from the start of the host name. `AND`
//! becomes a run of lookaheads, `NOT` a negative lookahead and `OR` an
//! alternation. Clients that run this need a regex engine with lookaround.

use crate::error::SerializeError;
use crate::rule_type::{LogicalOperator, RuleType};

use super::{ConcreteRule, LogicalTree, NodeId, NodeKind};

const CLIENT: &str = "egern";
const HOST_CHARS: &str = r"[\w.-]";

/// A translated sub-expression.
enum Fragment {
    /// Zero-width assertions, already wrapped.
    Lookaround(String),
    /// A pattern that consumes from the current position.
    Body(String),
}

impl Fragment {
    fn as_assertion(&self) -> String {
        match self {
            Fragment::Lookaround(s) => s.clone(),
            Fragment::Body(s) => format!("(?={})", s),
        }
    }

    fn as_inner(&self) -> &str {
        match self {
            Fragment::Lookaround(s) | Fragment::Body(s) => s,
        }
    }
}

/// Translate a tree into one `^`-anchored regex over host names.
pub fn to_domain_regex(tree: &LogicalTree) -> Result<String, SerializeError> {
    let fragment = translate(tree, tree.root())?;
    Ok(format!("^{}", fragment.as_inner()))
}

fn translate(tree: &LogicalTree, id: NodeId) -> Result<Fragment, SerializeError> {
    match tree.kind(id) {
        NodeKind::Rule(rule) => leaf(rule, &tree.path(id)).map(Fragment::Body),
        NodeKind::Operator { op, children } => {
            let arity_ok = match op {
                LogicalOperator::Not => children.len() == 1,
                LogicalOperator::And | LogicalOperator::Or => children.len() >= 2,
            };
            if !arity_ok {
                return Err(SerializeError::InvalidArity {
                    operator: op.as_str(),
                    found: children.len(),
                    path: tree.path(id),
                });
            }
            let parts = children
                .iter()
                .map(|child| translate(tree, *child))
                .collect::<Result<Vec<_>, _>>()?;
            let fragment = match op {
                LogicalOperator::And => {
                    Fragment::Lookaround(parts.iter().map(Fragment::as_assertion).collect())
                }
                LogicalOperator::Not => {
                    Fragment::Lookaround(format!("(?!{})", parts[0].as_inner()))
                }
                LogicalOperator::Or => {
                    let alternatives: Vec<&str> = parts.iter().map(Fragment::as_inner).collect();
                    Fragment::Body(format!("(?:{})", alternatives.join("|")))
                }
            };
            Ok(fragment)
        }
    }
}

fn leaf(rule: &ConcreteRule, path: &str) -> Result<String, SerializeError> {
    let value = rule.value();
    let pattern = match rule.rule_type() {
        RuleType::Domain => format!("{}$", regex::escape(value)),
        RuleType::DomainSuffix => format!(r"(?:{}+\.)?{}$", HOST_CHARS, regex::escape(value)),
        RuleType::DomainKeyword => format!("{}*?{}", HOST_CHARS, regex::escape(value)),
        RuleType::DomainWildcard => {
            let escaped = regex::escape(value)
                .replace(r"\*", &format!("{}*?", HOST_CHARS))
                .replace(r"\?", HOST_CHARS);
            format!("{}$", escaped)
        }
        RuleType::DomainRegex => {
            // commas inside the regex split it into several values
            let regex = rule.values().join(",");
            match regex.strip_prefix('^') {
                Some(anchored) if !has_top_level_alternation(&regex) => {
                    format!("(?:{})", anchored)
                }
                _ => format!("{}*?(?:{})", HOST_CHARS, regex),
            }
        }
        RuleType::IpCidr
        | RuleType::IpCidr6
        | RuleType::IpAsn
        | RuleType::GeoIp
        | RuleType::UserAgent
        | RuleType::UrlRegex
        | RuleType::ProcessName
        | RuleType::SrcIp
        | RuleType::SrcPort
        | RuleType::InPort
        | RuleType::DestPort
        | RuleType::Protocol
        | RuleType::HostnameType => {
            return Err(SerializeError::UnsupportedRuleType {
                client: CLIENT,
                rule_type: rule.rule_type().as_str(),
                path: path.to_string(),
            })
        }
    };
    Ok(pattern)
}

/// Whether `|` appears outside every group and character class.
fn has_top_level_alternation(regex: &str) -> bool {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = regex.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => depth = depth.saturating_sub(1),
            '|' if !in_class && depth == 0 => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn translate_text(text: &str) -> Result<String, SerializeError> {
        to_domain_regex(&LogicalTree::parse(text).unwrap())
    }

    #[test]
    fn test_and_not_lookarounds() {
        let pattern =
            translate_text("AND,((DOMAIN-SUFFIX,example.com),(NOT,((DOMAIN,www.example.com))))")
                .unwrap();
        assert_eq!(
            pattern,
            r"^(?=(?:[\w.-]+\.)?example\.com$)(?!www\.example\.com$)"
        );
    }

    #[test]
    fn test_lookahead_child_not_rewrapped() {
        let pattern = translate_text(
            "AND,((AND,((DOMAIN-KEYWORD,ads),(DOMAIN-SUFFIX,a.com))),(NOT,((DOMAIN,x.a.com))))",
        )
        .unwrap();
        assert_eq!(
            pattern,
            r"^(?=[\w.-]*?ads)(?=(?:[\w.-]+\.)?a\.com$)(?!x\.a\.com$)"
        );
    }

    #[test]
    fn test_double_negation_nests() {
        let pattern = translate_text("NOT,((NOT,((DOMAIN,a.com))))").unwrap();
        assert_eq!(pattern, r"^(?!(?!a\.com$))");
    }

    #[test]
    fn test_or_matches_like_the_leaves() {
        let pattern = translate_text(
            "OR,((DOMAIN,a.com),(DOMAIN-SUFFIX,b.com),(DOMAIN-WILDCARD,img?.c*.net))",
        )
        .unwrap();
        let re = Regex::new(&pattern).unwrap();
        assert!(re.is_match("a.com"));
        assert!(!re.is_match("x.a.com"));
        assert!(re.is_match("b.com"));
        assert!(re.is_match("cdn.b.com"));
        assert!(!re.is_match("notb.com"));
        assert!(re.is_match("img1.cdn.net"));
        assert!(!re.is_match("img12.cdn.net"));
    }

    #[test]
    fn test_regex_leaf() {
        let pattern = translate_text(r"OR,((DOMAIN-REGEX,^ad\d+\.com$),(DOMAIN-KEYWORD,track))")
            .unwrap();
        let re = Regex::new(&pattern).unwrap();
        assert!(re.is_match("ad42.com"));
        assert!(re.is_match("s.tracker.io"));
        assert!(!re.is_match("x.ad42.com"));
    }

    #[test]
    fn test_regex_leaf_with_alternation_keeps_anchor_scope() {
        let pattern = translate_text(r"OR,((DOMAIN-REGEX,^a\.com|b\.net$),(DOMAIN,c.org))").unwrap();
        assert_eq!(pattern, r"^(?:[\w.-]*?(?:^a\.com|b\.net$)|c\.org$)");
        let re = Regex::new(&pattern).unwrap();
        assert!(re.is_match("a.com.cdn"));
        assert!(re.is_match("x.b.net"));
        assert!(!re.is_match("x.a.com.cdn"));
        assert!(!re.is_match("b.net.x"));
    }

    #[test]
    fn test_regex_leaf_grouped_alternation_still_anchored() {
        let pattern = translate_text(r"AND,((DOMAIN-REGEX,^(a|b)\.com$),(DOMAIN-KEYWORD,a))").unwrap();
        assert_eq!(pattern, r"^(?=(?:(a|b)\.com$))(?=[\w.-]*?a)");
        assert!(!has_top_level_alternation(r"^[a|b]\|c(d|e)$"));
        assert!(has_top_level_alternation(r"^a|(b)$"));
    }

    #[test]
    fn test_regex_leaf_with_comma() {
        let pattern = translate_text(r"AND,((DOMAIN-REGEX,^ad\d{1,3}\.com$),(DOMAIN-KEYWORD,ad))").unwrap();
        assert_eq!(pattern, r"^(?=(?:ad\d{1,3}\.com$))(?=[\w.-]*?ad)");
    }

    #[test]
    fn test_non_domain_leaf_rejected() {
        let err = translate_text("AND,((DOMAIN,a.com),(IP-CIDR,10.0.0.0/8))").unwrap_err();
        assert_eq!(
            err,
            SerializeError::UnsupportedRuleType {
                client: "egern",
                rule_type: "IP-CIDR",
                path: "AND[1] > IP-CIDR".to_string(),
            }
        );
    }
}
