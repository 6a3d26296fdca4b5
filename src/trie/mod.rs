//! Containment-aware insertion structures.

pub mod domain;
pub mod ip;

pub use domain::{DomainEntry, DomainTrie};
pub use ip::{IpTrie, Ipv4Trie, Ipv6Trie, Prefix};
