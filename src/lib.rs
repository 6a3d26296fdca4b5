//! rulesmith - rule-set normalization and multi-client serialization.
//!
//! This crate reads proxy rule lists from several upstream formats, folds them
//! into one deduplicated [`RuleSet`], and renders that set for each supported
//! client.
//!
//! # Features
//!
//! - **Domain trie**: `DOMAIN-SUFFIX` entries absorb every domain below them
//! - **IP prefix tries**: covered and duplicate CIDRs are dropped on insert
//! - **Keyword index**: Aho-Corasick filtering of domains and redundant keywords
//! - **Logical rules**: `AND`/`OR`/`NOT` expressions parsed into a tree and
//!   re-emitted in each client's dialect
//! - **Deterministic output**: the same inputs always produce byte-identical files
//!
//! # Quick Start
//!
//! ```
//! use rulesmith::{Client, Rule, RuleSet, SerializationOptions};
//!
//! let mut set = RuleSet::new();
//! set.insert(Rule::parse_line("DOMAIN-SUFFIX,example.com")?);
//! set.insert(Rule::parse_line("DOMAIN,www.example.com")?);
//! set.insert(Rule::parse_line("AND,((DOMAIN,a.com),(PROTOCOL,UDP))")?);
//! set.sort();
//!
//! let model = set.to_model();
//! assert_eq!(model.domain_suffix, vec!["example.com"]);
//! assert!(model.domain.is_empty());
//!
//! let outputs = rulesmith::serializer::serialize(
//!     Client::Surge,
//!     &model,
//!     &SerializationOptions::default(),
//! )?;
//! assert!(outputs[0].content.contains("DOMAIN-SUFFIX,example.com"));
//! # Ok::<(), rulesmith::Error>(())
//! ```
//!
//! # Pipeline
//!
//! 1. [`converter`] turns each input document into a [`RuleSet`]
//! 2. [`RuleSet::merge`] folds the sets together
//! 3. [`RuleSet::filter`] applies the [`ProcessingOptions`]
//! 4. [`RuleSet::to_model`] snapshots the set in output order
//! 5. [`serializer::serialize`] renders one document per client

mod error;
mod rule_type;

pub mod converter;
pub mod keyword;
pub mod logical;
pub mod rule;
pub mod ruleset;
pub mod serializer;
pub mod trie;

// Re-export core types
pub use error::{Error, LogicalParseError, Result, SerializeError, ValidationError};
pub use rule_type::{DomainType, LogicalOperator, RuleType};

// Re-export rule and set types
pub use rule::Rule;
pub use ruleset::{
    FilterReport, Options, ProcessingOptions, RuleField, RuleSet, SerializableRuleModel,
    SerializationOptions,
};

// Re-export engine types
pub use keyword::{KeywordIndex, KeywordIndexCache};
pub use logical::LogicalTree;
pub use serializer::{Client, Output};
pub use trie::{DomainTrie, Ipv4Trie, Ipv6Trie};
