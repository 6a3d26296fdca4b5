//! Approximate a domain regex with `DOMAIN-WILDCARD` globs.
//!
//! Literals are copied, single-character classes become `?`, unbounded
//! repetitions and alternations become `*`. Short bounded repetitions are
//! expanded into one glob per count. Anchors are dropped.

use regex_syntax::hir::{Hir, HirKind};
use regex_syntax::Parser;

/// Bounded repetitions spanning more counts than this collapse to `*`.
const MAX_EXPANDED_RANGE: u32 = 5;

/// A pattern expanding into more globs than this is not converted.
const MAX_WILDCARDS: usize = 32;

/// Convert a domain regex into wildcard globs.
///
/// Returns an empty list when the pattern uses syntax the regex parser does
/// not accept (lookaround, backreferences), expands into too many globs, or
/// reduces to a glob without any literal character.
pub fn regex_to_wildcards(pattern: &str) -> Vec<String> {
    let hir = match Parser::new().parse(pattern) {
        Ok(hir) => hir,
        Err(e) => {
            log::debug!("No wildcard for regex '{}': {}", pattern, e);
            return Vec::new();
        }
    };
    let Some(globs) = expand(&hir) else {
        log::debug!("No wildcard for regex '{}': too many alternatives", pattern);
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::with_capacity(globs.len());
    for glob in globs {
        let glob = tidy(&glob);
        if glob.chars().any(|c| c.is_ascii_alphanumeric()) && !out.contains(&glob) {
            out.push(glob);
        }
    }
    out
}

fn expand(hir: &Hir) -> Option<Vec<String>> {
    let globs = match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => vec![String::new()],
        HirKind::Literal(lit) => vec![String::from_utf8_lossy(&lit.0).into_owned()],
        HirKind::Class(_) => vec!["?".to_string()],
        HirKind::Alternation(_) => vec!["*".to_string()],
        HirKind::Capture(cap) => expand(&cap.sub)?,
        HirKind::Concat(parts) => {
            let mut globs = vec![String::new()];
            for part in parts {
                globs = product(&globs, &expand(part)?)?;
            }
            globs
        }
        HirKind::Repetition(rep) => {
            let subs = expand(&rep.sub)?;
            let min = rep.min as usize;
            let mut globs = Vec::new();
            for sub in &subs {
                match rep.max {
                    Some(max) if max == rep.min => globs.push(sub.repeat(min)),
                    None if min > 1 => globs.push(format!("{}*", sub.repeat(min))),
                    None => globs.push("*".to_string()),
                    Some(max) if max - rep.min <= MAX_EXPANDED_RANGE => {
                        globs.extend((rep.min..=max).map(|count| sub.repeat(count as usize)))
                    }
                    Some(_) => globs.push(format!("{}*", sub.repeat(min))),
                }
            }
            globs
        }
    };
    (globs.len() <= MAX_WILDCARDS).then_some(globs)
}

fn product(left: &[String], right: &[String]) -> Option<Vec<String>> {
    if left.len() * right.len() > MAX_WILDCARDS {
        return None;
    }
    Some(
        left.iter()
            .flat_map(|l| right.iter().map(move |r| format!("{}{}", l, r)))
            .collect(),
    )
}

/// Collapse `**` runs and turn a leading `?*.` into `*.`.
fn tidy(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len());
    for c in glob.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    match out.strip_prefix("?*.") {
        Some(rest) => format!("*.{}", rest),
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_subdomain() {
        assert_eq!(
            regex_to_wildcards(r"^(.+\.)?example\.com$"),
            vec!["example.com", "*.example.com"]
        );
    }

    #[test]
    fn test_classes_and_repetitions() {
        assert_eq!(regex_to_wildcards(r"^ad[0-9]\.example\.com$"), vec!["ad?.example.com"]);
        assert_eq!(regex_to_wildcards(r"^ad\d+\.example\.com$"), vec!["ad*.example.com"]);
        assert_eq!(
            regex_to_wildcards(r"^cdn\d{1,2}\.example\.com$"),
            vec!["cdn?.example.com", "cdn??.example.com"]
        );
        assert_eq!(regex_to_wildcards(r"^x\d{2,}\.net$"), vec!["x??*.net"]);
        assert_eq!(regex_to_wildcards(r"^s\d{1,20}\.net$"), vec!["s?*.net"]);
    }

    #[test]
    fn test_alternation_and_leading_wildcard() {
        assert_eq!(regex_to_wildcards(r"^(foo|bar)\.example\.com$"), vec!["*.example.com"]);
        assert_eq!(regex_to_wildcards(r"^.*\.example\.com$"), vec!["*.example.com"]);
        assert_eq!(regex_to_wildcards(r"^.+\.example\.com$"), vec!["*.example.com"]);
    }

    #[test]
    fn test_unconvertible_patterns() {
        assert!(regex_to_wildcards(r"^(?!www\.)ad\..*").is_empty());
        assert!(regex_to_wildcards(r"^a\.com$|^b\.com$").is_empty());
        assert!(regex_to_wildcards(r"^a{0,5}b{0,5}c{0,5}\.com$").is_empty());
        assert!(regex_to_wildcards(".*").is_empty());
    }
}
