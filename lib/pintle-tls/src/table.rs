/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use ahash::AHashSet;
use anyhow::anyhow;
use log::debug;

use pintle_types::net::Host;
use pintle_types::route::CredentialStore;

use super::{CredentialConfig, CredentialContext, ServerCredential, load_ticket_key_file};

/// One generation of the credential configuration.
///
/// A table is assembled by a [`CredentialTableBuilder`] and structurally
/// immutable afterwards, so lookups are lock-free. A reload builds a whole
/// new table and publishes it; connections holding contexts of an old
/// generation keep them alive through their `Arc`s. The only state that
/// changes inside a live table is the credential cell of an individual
/// [`CredentialContext`].
pub struct CredentialTable {
    store: CredentialStore<Arc<CredentialContext>>,
    default_context: Option<Arc<CredentialContext>>,
    valid: bool,
    entries: Vec<Arc<CredentialContext>>,
}

impl CredentialTable {
    /// Whether every construction step succeeded. An invalid table must not
    /// be published; the previously active generation stays in force.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Find the credential for `host`. Exact keys beat wildcard keys; a miss
    /// falls back to the default credential if that one holds a server
    /// handle.
    pub fn find_host(&self, host: &Host) -> Option<&Arc<CredentialContext>> {
        self.store.get(host).or_else(|| self.usable_default())
    }

    /// Find the credential for a server name received from a client hello.
    /// An unparseable name matches nothing.
    pub fn find_server_name(&self, name: &str) -> Option<&Arc<CredentialContext>> {
        match Host::from_str(name) {
            Ok(host) => self.find_host(&host),
            Err(e) => {
                debug!("invalid server name {name:?}: {e}");
                None
            }
        }
    }

    /// Find the credential for a connection by its addresses, before any
    /// server name is known. The full lookup runs on the destination address
    /// first; the source address is only consulted if the destination
    /// matched nothing.
    pub fn find_address(
        &self,
        destination: IpAddr,
        source: Option<IpAddr>,
    ) -> Option<&Arc<CredentialContext>> {
        self.store
            .get(&Host::Ip(destination))
            .or_else(|| source.and_then(|ip| self.store.get(&Host::Ip(ip))))
            .or_else(|| self.usable_default())
    }

    /// The last resort credential, used when neither a name nor an address
    /// lookup is possible yet.
    #[inline]
    pub fn default_context(&self) -> Option<&Arc<CredentialContext>> {
        self.default_context.as_ref()
    }

    fn usable_default(&self) -> Option<&Arc<CredentialContext>> {
        let ctx = self.default_context.as_ref()?;
        if ctx.credential().is_tunnel() {
            None
        } else {
            Some(ctx)
        }
    }

    /// Number of distinct registered credential contexts.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed access for administrative sweeps. Out of range is a miss,
    /// not an error.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&Arc<CredentialContext>> {
        self.entries.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<CredentialContext>> {
        self.entries.iter()
    }
}

/// Builds one [`CredentialTable`] by replaying credential registrations.
///
/// Under strict validation any failed registration marks the finished table
/// invalid. Under lenient validation a failure is reported to the caller,
/// who may skip that credential and keep going.
pub struct CredentialTableBuilder {
    strict: bool,
    valid: bool,
    store: CredentialStore<Arc<CredentialContext>>,
    default_context: Option<Arc<CredentialContext>>,
    entries: Vec<Arc<CredentialContext>>,
    seen: AHashSet<usize>,
}

impl CredentialTableBuilder {
    pub fn new(strict: bool) -> Self {
        CredentialTableBuilder {
            strict,
            valid: true,
            store: CredentialStore::default(),
            default_context: None,
            entries: Vec::new(),
            seen: AHashSet::new(),
        }
    }

    fn fail(&mut self) {
        if self.strict {
            self.valid = false;
        }
    }

    fn track_entry(&mut self, ctx: &Arc<CredentialContext>) {
        // a context registered under many keys is enumerated once
        if self.seen.insert(Arc::as_ptr(ctx) as usize) {
            self.entries.push(ctx.clone());
        }
    }

    /// Register `ctx` under `key` (exact or wildcard hostname, IP address or
    /// CIDR network).
    pub fn insert_host(&mut self, key: &str, ctx: &Arc<CredentialContext>) -> anyhow::Result<()> {
        match self.store.add_host(key, ctx.clone()) {
            Ok(()) => {
                self.track_entry(ctx);
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Build a context from `config` and `credential`, load its ticket key
    /// file if one is configured, and register it under every key in `keys`.
    pub fn add_credential(
        &mut self,
        config: Arc<CredentialConfig>,
        credential: ServerCredential,
        keys: &[String],
    ) -> anyhow::Result<Arc<CredentialContext>> {
        let ctx = Arc::new(CredentialContext::with_config(credential, config.clone()));

        if let Some(path) = config.ticket_key_file() {
            match load_ticket_key_file(path) {
                Ok(Some(block)) => ctx.set_ticket_keys(block),
                Ok(None) => {
                    if config.ticket_keys_required() {
                        self.fail();
                        return Err(anyhow!(
                            "credential {} requires ticket keys but {} is not readable",
                            config.name(),
                            path.display()
                        ));
                    }
                }
                Err(e) => {
                    self.fail();
                    return Err(
                        e.context(format!("failed to load ticket keys for {}", config.name()))
                    );
                }
            }
        }

        for key in keys {
            self.insert_host(key, &ctx)?;
        }
        Ok(ctx)
    }

    /// Install the last resort credential.
    pub fn set_default(&mut self, ctx: Arc<CredentialContext>) {
        self.track_entry(&ctx);
        self.default_context = Some(ctx);
    }

    pub fn finish(self) -> CredentialTable {
        CredentialTable {
            store: self.store,
            default_context: self.default_context,
            valid: self.valid,
            entries: self.entries,
        }
    }
}
