//! Recursive-descent parser for logical rule expressions.

use crate::error::LogicalParseError;
use crate::rule_type::{LogicalOperator, RuleType};

use super::{check_arity, ConcreteRule, Expr, LogicalTree, MAX_DEPTH};

/// Parse `OP,((...),(...))` into a tree. Whitespace is insignificant.
pub(crate) fn parse(text: &str) -> Result<LogicalTree, LogicalParseError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(LogicalParseError::Empty);
    }

    let parts = split_outside_parentheses(&compact)?;
    let head = parts[0];
    if LogicalOperator::parse(head).is_none() {
        if RuleType::parse(head).is_some() {
            return Err(LogicalParseError::BareRule(compact));
        }
        return Err(LogicalParseError::UnknownOperator(head.to_string()));
    }

    LogicalTree::from_expr(parse_operand(&compact, 1)?)
}

fn parse_operand(text: &str, depth: usize) -> Result<Expr, LogicalParseError> {
    let parts = split_outside_parentheses(text)?;
    let head = parts[0];

    if let Some(op) = LogicalOperator::parse(head) {
        if depth > MAX_DEPTH {
            return Err(LogicalParseError::TooDeep(MAX_DEPTH));
        }
        if parts.len() != 2 {
            return Err(LogicalParseError::InvalidRule(text.to_string()));
        }
        let body = strip_outer_parentheses(parts[1]);
        let operands = if body.is_empty() {
            Vec::new()
        } else {
            split_outside_parentheses(body)?
        };
        check_arity(op, operands.len())?;
        let children = operands
            .into_iter()
            .map(|operand| parse_operand(strip_outer_parentheses(operand), depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expr::Op(op, children));
    }

    if head.is_empty() || head.starts_with('(') {
        return Err(LogicalParseError::InvalidRule(text.to_string()));
    }
    let rule_type =
        RuleType::parse(head).ok_or_else(|| LogicalParseError::UnknownRuleType(head.to_string()))?;
    if parts.len() < 2 {
        return Err(LogicalParseError::InvalidRule(text.to_string()));
    }
    let rule = ConcreteRule::new(rule_type, &parts[1..])
        .map_err(|_| LogicalParseError::InvalidRule(text.to_string()))?;
    Ok(Expr::Rule(rule))
}

/// Split on commas at parenthesis depth zero.
fn split_outside_parentheses(text: &str) -> Result<Vec<&str>, LogicalParseError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| LogicalParseError::UnbalancedParentheses(text.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(LogicalParseError::UnbalancedParentheses(text.to_string()));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Remove one pair of parentheses when the opening one closes at the very end.
fn strip_outer_parentheses(text: &str) -> &str {
    if !text.starts_with('(') || !text.ends_with(')') {
        return text;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if i == text.len() - 1 {
                        &text[1..i]
                    } else {
                        text
                    };
                }
            }
            _ => {}
        }
    }
    text
}
