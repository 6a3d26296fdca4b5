//! Processing and serialization options.
//!
//! Options are plain serde structs with every field defaulted, so an empty
//! YAML document is a valid configuration:
//!
//! ```yaml
//! serialization:
//!   no_resolve: true
//!   clash_optimize: true
//! processing:
//!   exclude_rule_types: [ip_asn, ua]
//!   exclude_keywords: [tracker]
//!   exclude_suffixes: [example.com]
//! v2ray_domain:
//!   attrs:
//!     exclude_attrs: ["@cn"]
//!   exclude_includes: [category-ads]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::rule::validate_domain;
use crate::Result;

/// Top-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub serialization: SerializationOptions,
    pub processing: ProcessingOptions,
    pub v2ray_domain: V2rayDomainOptions,
}

impl Options {
    /// Parse options from YAML text.
    ///
    /// `exclude_suffixes` are normalized to lowercase domains; an invalid
    /// suffix or an empty keyword is a configuration error.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: Self = serde_yaml::from_str(content)?;
        options.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.processing.exclude_suffixes = self
            .processing
            .exclude_suffixes
            .iter()
            .map(|suffix| {
                validate_domain(suffix.trim_start_matches('.'))
                    .map_err(|e| Error::Config(format!("exclude_suffixes: {}", e)))
            })
            .collect::<Result<_>>()?;
        if self.processing.exclude_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::Config("exclude_keywords: empty keyword".to_string()));
        }
        Ok(self)
    }

    /// Load options from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Options consumed by client serializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializationOptions {
    /// Append `no-resolve` to IP rules.
    pub no_resolve: bool,
    /// Use Clash `domain`/`ipcidr` behaviors when possible.
    pub clash_optimize: bool,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self {
            no_resolve: true,
            clash_optimize: true,
        }
    }
}

/// Options consumed by [`RuleSet::filter`](crate::RuleSet::filter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Fields cleared before any other filtering.
    pub exclude_rule_types: Vec<RuleField>,
    /// Extra keywords that remove covered domains but are not emitted.
    pub exclude_keywords: Vec<String>,
    /// Suffixes whose whole subtree is removed from the domain trie.
    pub exclude_suffixes: Vec<String>,
}

/// A storage field of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    #[serde(alias = "domain_trie")]
    Domain,
    #[serde(alias = "ip_trie")]
    IpCidr,
    #[serde(alias = "ip_trie6")]
    IpCidr6,
    #[serde(alias = "asn")]
    IpAsn,
    #[serde(alias = "process_name")]
    Process,
    #[serde(alias = "user_agent")]
    Ua,
    #[serde(alias = "keyword")]
    DomainKeyword,
    #[serde(alias = "domain_regexp")]
    DomainRegex,
    UrlRegex,
    Logical,
}

/// Options for V2Ray domain-list input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct V2rayDomainOptions {
    pub attrs: AttrFilter,
    /// `include:` targets that are never reported.
    pub exclude_includes: Vec<String>,
}

/// Which V2Ray entries to keep based on their `@attr` tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrFilter {
    /// Keep every entry.
    #[default]
    All,
    /// Keep only entries without attributes.
    NoAttr,
    /// Keep entries carrying at least one of these attributes.
    Attrs(Vec<String>),
    /// Drop entries carrying any of these attributes.
    ExcludeAttrs(Vec<String>),
}

impl AttrFilter {
    /// Whether an entry with these attributes is kept. Attributes may be given with or without `@`.
    pub fn accepts(&self, attrs: &[String]) -> bool {
        let has = |wanted: &[String]| {
            attrs.iter().any(|attr| {
                wanted
                    .iter()
                    .any(|w| w.trim_start_matches('@') == attr.trim_start_matches('@'))
            })
        };
        match self {
            AttrFilter::All => true,
            AttrFilter::NoAttr => attrs.is_empty(),
            AttrFilter::Attrs(wanted) => has(wanted),
            AttrFilter::ExcludeAttrs(unwanted) => !has(unwanted),
        }
    }
}
