//! Reversed-label domain trie with suffix containment.
//!
//! `www.example.com` is stored under the path `com -> example -> www`. A
//! `DOMAIN-SUFFIX` entry owns its whole subtree: while it exists nothing can
//! be added at or below it, and adding it removes everything that was there.

use ahash::AHashMap;

use crate::rule_type::DomainType;

/// One stored domain with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub domain: String,
    pub kind: DomainType,
}

#[derive(Debug, Default, Clone)]
struct Node {
    kind: Option<DomainType>,
    seq: u64,
    children: AHashMap<String, Node>,
}

impl Node {
    fn count(&self) -> usize {
        usize::from(self.kind.is_some()) + self.children.values().map(Node::count).sum::<usize>()
    }

    fn is_empty(&self) -> bool {
        self.kind.is_none() && self.children.is_empty()
    }
}

/// Domain trie keyed by reversed labels.
#[derive(Debug, Default, Clone)]
pub struct DomainTrie {
    root: Node,
    len: usize,
    next_seq: u64,
}

fn reversed_labels(domain: &str) -> Vec<&str> {
    domain.split('.').rev().collect()
}

impl DomainTrie {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain of the given kind.
    ///
    /// Returns `false` when the domain is already covered by a suffix entry
    /// on its path (including itself) or is already stored with the same kind.
    pub fn add(&mut self, domain: &str, kind: DomainType) -> bool {
        if domain.is_empty() {
            return false;
        }
        let labels = reversed_labels(domain);

        let mut node = &self.root;
        for label in &labels {
            match node.children.get(*label) {
                Some(child) if child.kind == Some(DomainType::DomainSuffix) => return false,
                Some(child) => node = child,
                None => break,
            }
        }

        let mut node = &mut self.root;
        for label in labels {
            node = node.children.entry(label.to_string()).or_default();
        }

        match node.kind {
            Some(existing) if existing == kind => return false,
            Some(_) => {}
            None => {
                node.seq = self.next_seq;
                self.next_seq += 1;
                self.len += 1;
            }
        }
        node.kind = Some(kind);

        if kind == DomainType::DomainSuffix {
            let dropped: usize = node.children.values().map(Node::count).sum();
            node.children.clear();
            self.len -= dropped;
        }
        true
    }

    /// Remove a single entry, returning its kind if it was stored.
    pub fn remove(&mut self, domain: &str) -> Option<DomainType> {
        let labels = reversed_labels(domain);
        let removed = Self::remove_at(&mut self.root, &labels);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_at(node: &mut Node, labels: &[&str]) -> Option<DomainType> {
        let Some((head, rest)) = labels.split_first() else {
            return node.kind.take();
        };
        let child = node.children.get_mut(*head)?;
        let removed = Self::remove_at(child, rest);
        if child.is_empty() {
            node.children.remove(*head);
        }
        removed
    }

    /// Remove the entry for `suffix` and every entry below it.
    ///
    /// Returns the number of entries removed.
    pub fn filter_by_domain(&mut self, suffix: &str) -> usize {
        if suffix.is_empty() {
            return 0;
        }
        let labels = reversed_labels(suffix);
        let removed = Self::take_subtree(&mut self.root, &labels);
        self.len -= removed;
        removed
    }

    fn take_subtree(node: &mut Node, labels: &[&str]) -> usize {
        let Some((head, rest)) = labels.split_first() else {
            return 0;
        };
        if rest.is_empty() {
            return node.children.remove(*head).map_or(0, |child| child.count());
        }
        let Some(child) = node.children.get_mut(*head) else {
            return 0;
        };
        let removed = Self::take_subtree(child, rest);
        if child.is_empty() {
            node.children.remove(*head);
        }
        removed
    }

    /// Add every entry of `other`, in its insertion order.
    pub fn merge(&mut self, other: &DomainTrie) {
        for entry in other.iter() {
            self.add(&entry.domain, entry.kind);
        }
    }

    /// Look up the kind stored for exactly `domain`.
    pub fn get(&self, domain: &str) -> Option<DomainType> {
        let mut node = &self.root;
        for label in reversed_labels(domain) {
            node = node.children.get(label)?;
        }
        node.kind
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = DomainEntry> {
        let mut entries = Vec::with_capacity(self.len);
        let mut path = Vec::new();
        Self::collect(&self.root, &mut path, &mut |seq, domain, kind| {
            entries.push((seq, DomainEntry { domain, kind }));
        });
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, entry)| entry)
    }

    /// Entries in label-sorted order: `com` before `net`, `a.com` before `b.com`,
    /// a parent before its subdomains.
    pub fn sorted_iter(&self) -> impl Iterator<Item = DomainEntry> {
        let mut entries = Vec::with_capacity(self.len);
        let mut path = Vec::new();
        Self::collect_sorted(&self.root, &mut path, &mut entries);
        entries.into_iter()
    }

    fn collect<'a, F>(node: &'a Node, path: &mut Vec<&'a str>, visit: &mut F)
    where
        F: FnMut(u64, String, DomainType),
    {
        if let Some(kind) = node.kind {
            visit(node.seq, join_reversed(path), kind);
        }
        for (label, child) in &node.children {
            path.push(label);
            Self::collect(child, path, visit);
            path.pop();
        }
    }

    fn collect_sorted<'a>(node: &'a Node, path: &mut Vec<&'a str>, out: &mut Vec<DomainEntry>) {
        if let Some(kind) = node.kind {
            out.push(DomainEntry {
                domain: join_reversed(path),
                kind,
            });
        }
        let mut children: Vec<_> = node.children.iter().collect();
        children.sort_by(|a, b| a.0.cmp(b.0));
        for (label, child) in children {
            path.push(label);
            Self::collect_sorted(child, path, out);
            path.pop();
        }
    }
}

fn join_reversed(path: &[&str]) -> String {
    let mut labels = path.to_vec();
    labels.reverse();
    labels.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(trie: &DomainTrie) -> Vec<String> {
        trie.iter().map(|e| e.domain).collect()
    }

    #[test]
    fn test_suffix_dominance() {
        let mut trie = DomainTrie::new();
        assert!(trie.add("a.example.com", DomainType::Domain));
        assert!(trie.add("b.example.com", DomainType::DomainSuffix));
        assert!(trie.add("example.com", DomainType::DomainSuffix));
        assert!(!trie.add("x.y.example.com", DomainType::Domain));
        assert!(!trie.add("example.com", DomainType::Domain));

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get("example.com"), Some(DomainType::DomainSuffix));
        assert_eq!(trie.get("a.example.com"), None);
    }

    #[test]
    fn test_suffix_does_not_cover_siblings() {
        let mut trie = DomainTrie::new();
        trie.add("example.com", DomainType::DomainSuffix);
        assert!(trie.add("example.net", DomainType::Domain));
        assert!(trie.add("myexample.com", DomainType::Domain));
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_exact_then_suffix_on_same_name() {
        let mut trie = DomainTrie::new();
        trie.add("example.com", DomainType::Domain);
        trie.add("www.example.com", DomainType::Domain);
        assert!(trie.add("example.com", DomainType::DomainSuffix));
        assert_eq!(trie.len(), 1);
        assert_eq!(domains(&trie), vec!["example.com"]);
    }

    #[test]
    fn test_duplicate_add() {
        let mut trie = DomainTrie::new();
        assert!(trie.add("example.com", DomainType::Domain));
        assert!(!trie.add("example.com", DomainType::Domain));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_remove_prunes() {
        let mut trie = DomainTrie::new();
        trie.add("a.b.example.com", DomainType::Domain);
        trie.add("example.com", DomainType::Domain);
        assert_eq!(trie.remove("a.b.example.com"), Some(DomainType::Domain));
        assert_eq!(trie.remove("a.b.example.com"), None);
        assert_eq!(trie.len(), 1);
        let example = trie
            .root
            .children
            .get("com")
            .and_then(|com| com.children.get("example"));
        assert!(example.map_or(false, |node| node.children.is_empty()));
    }

    #[test]
    fn test_filter_by_domain() {
        let mut trie = DomainTrie::new();
        trie.add("example.com", DomainType::Domain);
        trie.add("a.example.com", DomainType::Domain);
        trie.add("b.a.example.com", DomainType::DomainWildcard);
        trie.add("example.org", DomainType::Domain);

        assert_eq!(trie.filter_by_domain("example.com"), 3);
        assert_eq!(trie.len(), 1);
        assert_eq!(domains(&trie), vec!["example.org"]);
        assert_eq!(trie.filter_by_domain("missing.net"), 0);
    }

    #[test]
    fn test_insertion_order() {
        let mut trie = DomainTrie::new();
        trie.add("z.com", DomainType::Domain);
        trie.add("a.net", DomainType::Domain);
        trie.add("b.z.com", DomainType::Domain);
        assert_eq!(domains(&trie), vec!["z.com", "a.net", "b.z.com"]);
    }

    #[test]
    fn test_sorted_order() {
        let mut trie = DomainTrie::new();
        trie.add("z.com", DomainType::Domain);
        trie.add("a.net", DomainType::Domain);
        trie.add("b.z.com", DomainType::Domain);
        trie.add("a.com", DomainType::DomainSuffix);
        let sorted: Vec<String> = trie.sorted_iter().map(|e| e.domain).collect();
        assert_eq!(sorted, vec!["a.com", "z.com", "b.z.com", "a.net"]);
    }

    #[test]
    fn test_merge() {
        let mut left = DomainTrie::new();
        left.add("www.example.com", DomainType::Domain);
        let mut right = DomainTrie::new();
        right.add("example.com", DomainType::DomainSuffix);
        right.add("other.com", DomainType::Domain);

        left.merge(&right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.get("example.com"), Some(DomainType::DomainSuffix));
        assert_eq!(left.get("www.example.com"), None);
    }
}
