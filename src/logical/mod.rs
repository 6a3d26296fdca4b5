//! Nested AND/OR/NOT rule expressions.
//!
//! A [`LogicalTree`] is an immutable arena of nodes. The root is always an
//! operator; `AND`/`OR` nodes hold at least two children and `NOT` exactly
//! one. Every node except the root keeps its parent index so that errors can
//! report where in the tree they happened.
//!
//! Trees compare, hash and sort by their canonical text:
//!
//! ```text
//! AND,((DOMAIN,example.com),(NOT,((PROTOCOL,UDP))))
//! ```

mod parser;
pub mod pattern;
pub mod structured;
pub mod text;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::LogicalParseError;
use crate::rule_type::{LogicalOperator, RuleType};

pub use pattern::to_domain_regex;
pub use structured::to_sing_box;
pub use text::{to_text, Canonical, ClashDialect, LoonDialect, SurgeDialect, TextDialect};

/// Deepest operator nesting accepted by [`LogicalTree::parse`] and [`LogicalTree::from_expr`].
pub const MAX_DEPTH: usize = 64;

/// A typed leaf: rule type plus one or more values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteRule {
    rule_type: RuleType,
    values: Vec<String>,
}

impl ConcreteRule {
    /// Create a leaf. Values are trimmed and empty ones dropped; at least one must remain.
    pub fn new<I, S>(rule_type: RuleType, values: I) -> Result<Self, LogicalParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(LogicalParseError::InvalidRule(rule_type.as_str().to_string()));
        }
        Ok(Self { rule_type, values })
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The primary value.
    pub fn value(&self) -> &str {
        &self.values[0]
    }
}

impl fmt::Display for ConcreteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.rule_type, self.values.join(","))
    }
}

/// Owned expression used to build a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Op(LogicalOperator, Vec<Expr>),
    Rule(ConcreteRule),
}

impl Expr {
    pub fn and(children: Vec<Expr>) -> Self {
        Expr::Op(LogicalOperator::And, children)
    }

    pub fn or(children: Vec<Expr>) -> Self {
        Expr::Op(LogicalOperator::Or, children)
    }

    pub fn not(child: Expr) -> Self {
        Expr::Op(LogicalOperator::Not, vec![child])
    }
}

/// Index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Operator {
        op: LogicalOperator,
        children: Vec<NodeId>,
    },
    Rule(ConcreteRule),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Parsed logical rule.
#[derive(Debug, Clone)]
pub struct LogicalTree {
    nodes: Vec<Node>,
    root: NodeId,
    canonical: String,
}

pub(crate) fn check_arity(op: LogicalOperator, found: usize) -> Result<(), LogicalParseError> {
    match op {
        LogicalOperator::Not if found != 1 => Err(LogicalParseError::NotArity(found)),
        LogicalOperator::And | LogicalOperator::Or if found < 2 => {
            Err(LogicalParseError::AndOrArity {
                operator: op.as_str(),
                found,
            })
        }
        _ => Ok(()),
    }
}

impl LogicalTree {
    /// Parse an expression such as `OR,((DOMAIN,a.com),(DOMAIN-SUFFIX,b.com))`.
    pub fn parse(text: &str) -> Result<Self, LogicalParseError> {
        parser::parse(text)
    }

    /// Build a tree from an expression, checking operator arity.
    pub fn from_expr(expr: Expr) -> Result<Self, LogicalParseError> {
        if let Expr::Rule(rule) = &expr {
            return Err(LogicalParseError::BareRule(rule.to_string()));
        }
        let mut nodes = Vec::new();
        let root = Self::push(&mut nodes, expr, None, 1)?;
        let mut tree = Self {
            nodes,
            root,
            canonical: String::new(),
        };
        tree.canonical = tree.canonical_text(root);
        Ok(tree)
    }

    fn push(
        nodes: &mut Vec<Node>,
        expr: Expr,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId, LogicalParseError> {
        let id = NodeId(nodes.len());
        match expr {
            Expr::Rule(rule) => nodes.push(Node {
                kind: NodeKind::Rule(rule),
                parent,
            }),
            Expr::Op(op, children) => {
                if depth > MAX_DEPTH {
                    return Err(LogicalParseError::TooDeep(MAX_DEPTH));
                }
                check_arity(op, children.len())?;
                nodes.push(Node {
                    kind: NodeKind::Operator {
                        op,
                        children: Vec::with_capacity(children.len()),
                    },
                    parent,
                });
                for child in children {
                    let child_id = Self::push(nodes, child, Some(id), depth + 1)?;
                    if let NodeKind::Operator { children, .. } = &mut nodes[id.0].kind {
                        children.push(child_id);
                    }
                }
            }
        }
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Root operator. `None` only for a rule root, which construction rejects.
    pub fn operator(&self) -> Option<LogicalOperator> {
        match self.kind(self.root) {
            NodeKind::Operator { op, .. } => Some(*op),
            NodeKind::Rule(_) => None,
        }
    }

    /// Every leaf, depth first.
    pub fn leaves(&self) -> impl Iterator<Item = &ConcreteRule> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Operator { .. } => None,
        })
    }

    /// Canonical text form.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Location of a node, e.g. `AND[1] > NOT[0] > DOMAIN`.
    pub fn path(&self, id: NodeId) -> String {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if let NodeKind::Operator { op, children } = self.kind(parent) {
                let index = children.iter().position(|c| *c == current).unwrap_or(0);
                steps.push(format!("{}[{}]", op, index));
            }
            current = parent;
        }
        steps.reverse();
        let own = match self.kind(id) {
            NodeKind::Operator { op, .. } => op.as_str(),
            NodeKind::Rule(rule) => rule.rule_type().as_str(),
        };
        steps.push(own.to_string());
        steps.join(" > ")
    }

    fn canonical_text(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Rule(rule) => rule.to_string(),
            NodeKind::Operator { op, children } => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| format!("({})", self.canonical_text(*child)))
                    .collect();
                format!("{},({})", op, parts.join(","))
            }
        }
    }

    /// Draw the tree with box characters.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, "", None, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, prefix: &str, last: Option<bool>, out: &mut String) {
        let label = match self.kind(id) {
            NodeKind::Operator { op, .. } => op.to_string(),
            NodeKind::Rule(rule) => rule.to_string(),
        };
        let child_prefix = match last {
            None => {
                out.push_str(&label);
                String::new()
            }
            Some(is_last) => {
                out.push_str(prefix);
                out.push_str(if is_last { "└── " } else { "├── " });
                out.push_str(&label);
                format!("{}{}", prefix, if is_last { "    " } else { "│   " })
            }
        };
        out.push('\n');
        if let NodeKind::Operator { children, .. } = self.kind(id) {
            for (i, child) in children.iter().enumerate() {
                self.render_node(*child, &child_prefix, Some(i + 1 == children.len()), out);
            }
        }
    }
}

impl PartialEq for LogicalTree {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for LogicalTree {}

impl Hash for LogicalTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for LogicalTree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogicalTree {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for LogicalTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
