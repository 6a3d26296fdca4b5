//! Binary prefix trie with CIDR containment.
//!
//! Each level consumes one address bit. A stored prefix is a terminal node;
//! nothing is ever stored below a terminal, so the set of prefixes is always
//! free of containment.

use ipnet::{Ipv4Net, Ipv6Net};
use std::fmt;

/// An address prefix the trie can index bit by bit.
pub trait Prefix: Copy + Eq + fmt::Display {
    /// Number of significant bits.
    fn len_bits(&self) -> u8;

    /// Bit `index` of the network address, counted from the most significant bit.
    fn bit_at(&self, index: u8) -> usize;

    /// The same prefix with host bits cleared.
    fn truncated(&self) -> Self;
}

impl Prefix for Ipv4Net {
    fn len_bits(&self) -> u8 {
        self.prefix_len()
    }

    fn bit_at(&self, index: u8) -> usize {
        ((u32::from(self.network()) >> (31 - u32::from(index))) & 1) as usize
    }

    fn truncated(&self) -> Self {
        self.trunc()
    }
}

impl Prefix for Ipv6Net {
    fn len_bits(&self) -> u8 {
        self.prefix_len()
    }

    fn bit_at(&self, index: u8) -> usize {
        ((u128::from(self.network()) >> (127 - u32::from(index))) & 1) as usize
    }

    fn truncated(&self) -> Self {
        self.trunc()
    }
}

#[derive(Debug, Clone)]
struct Node<N> {
    prefix: Option<N>,
    children: [Option<Box<Node<N>>>; 2],
}

impl<N> Default for Node<N> {
    fn default() -> Self {
        Self {
            prefix: None,
            children: [None, None],
        }
    }
}

impl<N> Node<N> {
    fn count(&self) -> usize {
        usize::from(self.prefix.is_some())
            + self
                .children
                .iter()
                .flatten()
                .map(|child| child.count())
                .sum::<usize>()
    }
}

/// Prefix trie for one address family.
#[derive(Debug, Clone)]
pub struct IpTrie<N> {
    root: Node<N>,
    len: usize,
}

/// IPv4 prefix trie.
pub type Ipv4Trie = IpTrie<Ipv4Net>;

/// IPv6 prefix trie.
pub type Ipv6Trie = IpTrie<Ipv6Net>;

impl<N> Default for IpTrie<N> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }
}

impl<N: Prefix> IpTrie<N> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix.
    ///
    /// Returns `false` if a stored prefix already contains it. Otherwise the
    /// prefix is stored and every stored prefix it contains is removed.
    pub fn add(&mut self, prefix: N) -> bool {
        let prefix = prefix.truncated();
        let mut node = &mut self.root;
        for index in 0..prefix.len_bits() {
            if node.prefix.is_some() {
                return false;
            }
            let bit = prefix.bit_at(index);
            node = &mut **node.children[bit].get_or_insert_with(Box::default);
        }
        if node.prefix.is_some() {
            return false;
        }

        let dropped: usize = node.children.iter().flatten().map(|c| c.count()).sum();
        node.children = [None, None];
        node.prefix = Some(prefix);
        self.len = self.len + 1 - dropped;
        true
    }

    /// Whether a stored prefix contains `prefix` (or equals it).
    pub fn covers(&self, prefix: &N) -> bool {
        let prefix = prefix.truncated();
        let mut node = &self.root;
        for index in 0..prefix.len_bits() {
            if node.prefix.is_some() {
                return true;
            }
            match node.children[prefix.bit_at(index)].as_deref() {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.prefix.is_some()
    }

    /// Add every prefix of `other`.
    pub fn merge(&mut self, other: &IpTrie<N>) {
        for prefix in other.iter() {
            self.add(prefix);
        }
    }

    /// Number of stored prefixes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no prefixes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stored prefixes in ascending network-address order.
    pub fn iter(&self) -> Iter<'_, N> {
        Iter {
            stack: vec![&self.root],
        }
    }
}

/// Depth-first iterator over stored prefixes, zero branch first.
pub struct Iter<'a, N> {
    stack: Vec<&'a Node<N>>,
}

impl<'a, N: Prefix> Iterator for Iter<'a, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        while let Some(node) = self.stack.pop() {
            if let Some(one) = node.children[1].as_deref() {
                self.stack.push(one);
            }
            if let Some(zero) = node.children[0].as_deref() {
                self.stack.push(zero);
            }
            if let Some(prefix) = node.prefix {
                return Some(prefix);
            }
        }
        None
    }
}
