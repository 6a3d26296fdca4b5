//! RuleSet aggregation: merge, filter, sort and export.

mod config;
mod model;

pub use config::{
    AttrFilter, Options, ProcessingOptions, RuleField, SerializationOptions, V2rayDomainOptions,
};
pub use model::SerializableRuleModel;

use ahash::AHashSet;
use ipnet::IpNet;
use std::collections::BTreeSet;

use crate::keyword::KeywordIndexCache;
use crate::logical::LogicalTree;
use crate::rule::Rule;
use crate::rule_type::{DomainType, RuleType};
use crate::trie::{DomainTrie, Ipv4Trie, Ipv6Trie};
use crate::Result;

/// Counts of what a [`RuleSet::filter`] pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Entries removed by `exclude_suffixes`.
    pub suffixes: usize,
    /// Keywords covered by another keyword.
    pub keywords: usize,
    /// Domain entries covered by a keyword.
    pub domains: usize,
}

impl FilterReport {
    pub fn total(&self) -> usize {
        self.suffixes + self.keywords + self.domains
    }
}

/// Canonical in-memory rule set.
///
/// Domains and IP prefixes live in containment-aware tries, so inserting a
/// covering rule removes what it covers. String-valued sets are kept in
/// lexicographic order; logical trees keep insertion order until [`sort`](Self::sort).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    domains: DomainTrie,
    ipv4: Ipv4Trie,
    ipv6: Ipv6Trie,
    asns: BTreeSet<u32>,
    process_names: BTreeSet<String>,
    user_agents: BTreeSet<String>,
    keywords: BTreeSet<String>,
    domain_regexes: BTreeSet<String>,
    url_regexes: BTreeSet<String>,
    logical: Vec<LogicalTree>,
    logical_seen: AHashSet<String>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one rule. Returns `false` if it was already present or covered.
    pub fn insert(&mut self, rule: Rule) -> bool {
        match rule {
            Rule::Domain(d) => self.domains.add(&d, DomainType::Domain),
            Rule::DomainSuffix(d) => self.domains.add(&d, DomainType::DomainSuffix),
            Rule::DomainWildcard(d) => self.domains.add(&d, DomainType::DomainWildcard),
            Rule::DomainRegex(pattern) => self.domain_regexes.insert(pattern),
            Rule::UrlRegex(pattern) => self.url_regexes.insert(pattern),
            Rule::DomainKeyword(k) => self.keywords.insert(k),
            Rule::IpCidr(net) => self.ipv4.add(net),
            Rule::IpCidr6(net) => self.ipv6.add(net),
            Rule::IpAsn(asn) => self.asns.insert(asn),
            Rule::UserAgent(ua) => self.user_agents.insert(ua),
            Rule::ProcessName(name) => self.process_names.insert(name),
            Rule::Logical(tree) => self.add_logical(tree),
        }
    }

    /// Append a logical tree unless one with the same canonical text exists.
    pub fn add_logical(&mut self, tree: LogicalTree) -> bool {
        if !self.logical_seen.insert(tree.canonical().to_string()) {
            return false;
        }
        self.logical.push(tree);
        true
    }

    /// Add IP prefixes from an external database iterator, keeping those whose
    /// attributes pass `keep`. Returns the number of prefixes stored.
    pub fn extend_prefixes<I, A, F>(&mut self, prefixes: I, mut keep: F) -> usize
    where
        I: IntoIterator<Item = (IpNet, A)>,
        F: FnMut(&A) -> bool,
    {
        let mut added = 0;
        for (net, attrs) in prefixes {
            if keep(&attrs) && self.insert(Rule::from(net)) {
                added += 1;
            }
        }
        log::debug!("Added {} prefixes from database", added);
        added
    }

    /// Union with another rule set.
    pub fn merge(&mut self, other: &RuleSet) {
        self.domains.merge(&other.domains);
        self.ipv4.merge(&other.ipv4);
        self.ipv6.merge(&other.ipv6);
        self.asns.extend(other.asns.iter().copied());
        self.process_names.extend(other.process_names.iter().cloned());
        self.user_agents.extend(other.user_agents.iter().cloned());
        self.keywords.extend(other.keywords.iter().cloned());
        self.domain_regexes
            .extend(other.domain_regexes.iter().cloned());
        self.url_regexes.extend(other.url_regexes.iter().cloned());
        for tree in &other.logical {
            self.add_logical(tree.clone());
        }
    }

    /// Remove redundant and excluded entries.
    ///
    /// Runs in order: clear excluded fields, drop `exclude_suffixes`
    /// subtrees, drop keywords containing another keyword, then drop domain
    /// entries containing any surviving or excluded keyword.
    pub fn filter(
        &mut self,
        options: &ProcessingOptions,
        cache: &KeywordIndexCache,
    ) -> Result<FilterReport> {
        let mut report = FilterReport::default();

        for field in &options.exclude_rule_types {
            log::info!("Excluding rule field {:?}", field);
            self.clear_field(*field);
        }

        for suffix in &options.exclude_suffixes {
            let removed = self.domains.filter_by_domain(suffix.trim());
            if removed > 0 {
                log::info!("Removed {} entries under excluded suffix {}", removed, suffix);
            }
            report.suffixes += removed;
        }

        if !self.keywords.is_empty() {
            let index = cache.get_or_build(&self.keywords)?;
            let before = self.keywords.len();
            self.keywords.retain(|keyword| match index.is_duplicate(keyword) {
                Some(cover) => {
                    log::info!(
                        "{},{} -> {},{}",
                        RuleType::DomainKeyword,
                        keyword,
                        RuleType::DomainKeyword,
                        cover
                    );
                    false
                }
                None => true,
            });
            report.keywords = before - self.keywords.len();
        }

        if !self.domains.is_empty()
            && (!self.keywords.is_empty() || !options.exclude_keywords.is_empty())
        {
            let index = cache.get_or_build(
                self.keywords
                    .iter()
                    .map(String::as_str)
                    .chain(options.exclude_keywords.iter().map(String::as_str)),
            )?;
            for entry in self.domains.iter() {
                if let Some(keyword) = index.matched(&entry.domain) {
                    log::info!(
                        "{},{} -> {},{}",
                        entry.kind,
                        entry.domain,
                        RuleType::DomainKeyword,
                        keyword
                    );
                    self.domains.remove(&entry.domain);
                    report.domains += 1;
                }
            }
        }

        Ok(report)
    }

    fn clear_field(&mut self, field: RuleField) {
        match field {
            RuleField::Domain => self.domains = DomainTrie::new(),
            RuleField::IpCidr => self.ipv4 = Ipv4Trie::new(),
            RuleField::IpCidr6 => self.ipv6 = Ipv6Trie::new(),
            RuleField::IpAsn => self.asns.clear(),
            RuleField::Process => self.process_names.clear(),
            RuleField::Ua => self.user_agents.clear(),
            RuleField::DomainKeyword => self.keywords.clear(),
            RuleField::DomainRegex => self.domain_regexes.clear(),
            RuleField::UrlRegex => self.url_regexes.clear(),
            RuleField::Logical => {
                self.logical.clear();
                self.logical_seen.clear();
            }
        }
    }

    /// Order logical trees by canonical text. Every other field is ordered by construction.
    pub fn sort(&mut self) {
        self.logical.sort();
    }

    /// Flatten into plain ordered lists.
    pub fn to_model(&self) -> SerializableRuleModel {
        let mut model = SerializableRuleModel::default();
        for entry in self.domains.iter() {
            let list = match entry.kind {
                DomainType::Domain => &mut model.domain,
                DomainType::DomainSuffix => &mut model.domain_suffix,
                DomainType::DomainWildcard => &mut model.domain_wildcard,
            };
            list.push(entry.domain);
        }
        model.domain.sort();
        model.domain_suffix.sort();
        model.domain_wildcard.sort();
        model.domain_regex = self.domain_regexes.iter().cloned().collect();
        model.url_regex = self.url_regexes.iter().cloned().collect();

        model.domain_keyword = self.keywords.iter().cloned().collect();
        model.ip_cidr = self.ipv4.iter().collect();
        model.ip_cidr6 = self.ipv6.iter().collect();
        model.ip_asn = self.asns.iter().copied().collect();
        model.process = self.process_names.iter().cloned().collect();
        model.ua = self.user_agents.iter().cloned().collect();
        model.logical = self.logical.clone();
        model
    }

    pub fn domains(&self) -> &DomainTrie {
        &self.domains
    }

    pub fn ipv4(&self) -> &Ipv4Trie {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &Ipv6Trie {
        &self.ipv6
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn logical(&self) -> &[LogicalTree] {
        &self.logical
    }

    /// Total number of stored rules.
    pub fn len(&self) -> usize {
        self.domains.len()
            + self.ipv4.len()
            + self.ipv6.len()
            + self.asns.len()
            + self.process_names.len()
            + self.user_agents.len()
            + self.keywords.len()
            + self.domain_regexes.len()
            + self.url_regexes.len()
            + self.logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, rules: T) {
        for rule in rules {
            self.insert(rule);
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(rules: T) -> Self {
        let mut set = Self::new();
        set.extend(rules);
        set
    }
}
