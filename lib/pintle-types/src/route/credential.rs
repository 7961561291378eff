/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;

use ahash::AHashMap;
use anyhow::anyhow;
use arcstr::ArcStr;
use ip_network::IpNetwork;
use ip_network_table::IpNetworkTable;
use radix_trie::Trie;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use crate::net::{Host, normalize_domain};

/// Per-key credential list. Two entries per name is the common case
/// (an RSA and an ECDSA credential).
type EntrySeq<T> = SmallVec<[T; 2]>;

/// the input domain should be valid IDNA domain
fn reverse_domain(domain: &str) -> String {
    let from = domain.strip_prefix('.').unwrap_or(domain);
    let mut reversed = from.split('.').rev().collect::<Vec<&str>>().join(".");
    reversed.push('.');
    reversed
}

/// Credential index over two key spaces, hostnames and addresses, each with
/// an exact and a wildcard part.
///
/// Wildcard hostnames are stored in a trie keyed by the reversed parent
/// domain, so a lookup walks the queried name's suffixes in one pass and the
/// longest registered suffix, the most specific wildcard, wins. Wildcard
/// addresses are CIDR networks resolved by longest prefix.
///
/// The store is only mutable while it is being built; lookups on the frozen
/// store take no locks.
pub struct CredentialStore<T> {
    exact_domain: Option<AHashMap<ArcStr, EntrySeq<T>>>,
    wildcard_domain: Option<Trie<String, EntrySeq<T>>>,
    exact_ip: Option<FxHashMap<IpAddr, EntrySeq<T>>>,
    wildcard_ip: Option<IpNetworkTable<EntrySeq<T>>>,
}

impl<T> Default for CredentialStore<T> {
    fn default() -> Self {
        CredentialStore {
            exact_domain: None,
            wildcard_domain: None,
            exact_ip: None,
            wildcard_ip: None,
        }
    }
}

impl<T> CredentialStore<T> {
    /// Classify `key` and insert into the matching index.
    ///
    /// Accepted key forms: an exact domain, a `*.parent` wildcard domain, an
    /// IP literal, or a CIDR network. Entries inserted under the same key
    /// keep their insertion order.
    pub fn add_host(&mut self, key: &str, v: T) -> anyhow::Result<()> {
        if key.is_empty() {
            return Err(anyhow!("empty credential key"));
        }
        if let Some(parent) = key.strip_prefix("*.") {
            return self.add_wildcard_domain(parent, v);
        }
        if key.contains('*') {
            return Err(anyhow!(
                "unsupported wildcard key {key}: only a leading *. label is allowed"
            ));
        }
        if key.contains('/') {
            let net = IpNetwork::from_str(key)
                .map_err(|e| anyhow!("invalid network key {key}: {e}"))?;
            self.add_ip_network(net, v);
            return Ok(());
        }
        match Host::from_str(key).map_err(|e| anyhow!("invalid credential key {key}: {e}"))? {
            Host::Ip(ip) => {
                self.add_exact_ip(ip, v);
                Ok(())
            }
            Host::Domain(domain) => {
                self.push_exact_domain(domain, v);
                Ok(())
            }
        }
    }

    pub fn add_exact_domain(&mut self, domain: &str, v: T) -> anyhow::Result<()> {
        let domain = normalize_domain(domain)?;
        self.push_exact_domain(domain, v);
        Ok(())
    }

    fn push_exact_domain(&mut self, domain: ArcStr, v: T) {
        self.exact_domain
            .get_or_insert_with(Default::default)
            .entry(domain)
            .or_default()
            .push(v);
    }

    /// Register a wildcard credential for all names below `parent`.
    pub fn add_wildcard_domain(&mut self, parent: &str, v: T) -> anyhow::Result<()> {
        if parent.contains('*') {
            return Err(anyhow!("invalid wildcard parent domain {parent}"));
        }
        let parent = normalize_domain(parent)?;
        let key = reverse_domain(&parent);

        let trie = self.wildcard_domain.get_or_insert_with(Trie::new);
        if let Some(seq) = trie.get_mut(&key) {
            seq.push(v);
        } else {
            trie.insert(key, smallvec![v]);
        }
        Ok(())
    }

    pub fn add_exact_ip(&mut self, ip: IpAddr, v: T) {
        self.exact_ip
            .get_or_insert_with(Default::default)
            .entry(ip)
            .or_default()
            .push(v);
    }

    pub fn add_ip_network(&mut self, net: IpNetwork, v: T) {
        let table = self.wildcard_ip.get_or_insert_with(IpNetworkTable::new);
        match table.remove(net) {
            Some(mut seq) => {
                seq.push(v);
                table.insert(net, seq);
            }
            None => {
                table.insert(net, smallvec![v]);
            }
        }
    }

    /// Get the preferred credential for `host`: the first entry registered
    /// under the best matching key. Exact keys beat wildcard keys.
    pub fn get(&self, host: &Host) -> Option<&T> {
        self.get_all(host).and_then(|seq| seq.first())
    }

    /// Get all credentials registered under the best matching key, in
    /// insertion order.
    pub fn get_all(&self, host: &Host) -> Option<&[T]> {
        match host {
            Host::Ip(ip) => self.get_ip_entries(*ip),
            Host::Domain(domain) => self.get_domain_entries(domain),
        }
    }

    fn get_domain_entries(&self, domain: &str) -> Option<&[T]> {
        if let Some(ht) = &self.exact_domain
            && let Some(seq) = ht.get(domain)
        {
            return Some(seq.as_slice());
        }

        // a wildcard never covers its own parent name, so probe the trie
        // with the reversed parent of the query
        if let Some(trie) = &self.wildcard_domain
            && let Some((_, parent)) = domain.split_once('.')
        {
            let reversed = reverse_domain(parent);
            if let Some(seq) = trie.get_ancestor_value(&reversed) {
                return Some(seq.as_slice());
            }
        }

        None
    }

    fn get_ip_entries(&self, ip: IpAddr) -> Option<&[T]> {
        if let Some(ht) = &self.exact_ip
            && let Some(seq) = ht.get(&ip)
        {
            return Some(seq.as_slice());
        }

        if let Some(table) = &self.wildcard_ip
            && let Some((_net, seq)) = table.longest_match(ip)
        {
            return Some(seq.as_slice());
        }

        None
    }

    pub fn is_empty(&self) -> bool {
        self.exact_domain.is_none()
            && self.wildcard_domain.is_none()
            && self.exact_ip.is_none()
            && self.wildcard_ip.is_none()
    }
}
