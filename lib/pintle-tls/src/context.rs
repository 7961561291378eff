/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use openssl::ssl::SslContext;

use pintle_types::net::TicketKeyBlock;

use super::CredentialConfig;

/// How to serve a connection matched to a credential.
pub enum ServerCredential {
    /// terminate TLS locally with this server context
    Terminate(SslContext),
    /// forward the byte stream without terminating
    Tunnel,
}

impl ServerCredential {
    pub fn ssl_context(&self) -> Option<&SslContext> {
        match self {
            ServerCredential::Terminate(ctx) => Some(ctx),
            ServerCredential::Tunnel => None,
        }
    }

    #[inline]
    pub fn is_tunnel(&self) -> bool {
        matches!(self, ServerCredential::Tunnel)
    }
}

/// One registered server credential.
///
/// The credential cell can be swapped while handshakes on other threads hold
/// references obtained from [`credential`](Self::credential): readers take a
/// strong reference with an atomic load, a writer installs a new one, and the
/// replaced handle is freed when its last holder drops it, never inside the
/// swap. Teardown needs no separate release step, dropping the context is it.
///
/// A context is not cloneable. It may own a [`TicketKeyBlock`], which is
/// itself move-only, so sharing a context means sharing it behind an `Arc`.
pub struct CredentialContext {
    credential: ArcSwap<ServerCredential>,
    config: Option<Arc<CredentialConfig>>,
    ticket_keys: ArcSwapOption<TicketKeyBlock>,
}

impl CredentialContext {
    pub fn new(credential: ServerCredential) -> Self {
        CredentialContext {
            credential: ArcSwap::from_pointee(credential),
            config: None,
            ticket_keys: ArcSwapOption::new(None),
        }
    }

    pub fn with_config(credential: ServerCredential, config: Arc<CredentialConfig>) -> Self {
        CredentialContext {
            credential: ArcSwap::from_pointee(credential),
            config: Some(config),
            ticket_keys: ArcSwapOption::new(None),
        }
    }

    /// Get a strong reference to the live credential.
    pub fn credential(&self) -> Arc<ServerCredential> {
        self.credential.load_full()
    }

    /// Install a new credential, e.g. after rotating the certificate behind
    /// an unchanged set of names.
    pub fn set_credential(&self, credential: ServerCredential) {
        self.credential.store(Arc::new(credential));
    }

    /// Install a new credential and return the replaced one.
    pub fn replace_credential(&self, credential: ServerCredential) -> Arc<ServerCredential> {
        self.credential.swap(Arc::new(credential))
    }

    #[inline]
    pub fn config(&self) -> Option<&Arc<CredentialConfig>> {
        self.config.as_ref()
    }

    pub fn ticket_keys(&self) -> Option<Arc<TicketKeyBlock>> {
        self.ticket_keys.load_full()
    }

    /// Attach session ticket keys. Ownership of the block moves in.
    pub fn set_ticket_keys(&self, block: TicketKeyBlock) {
        self.ticket_keys.store(Some(Arc::new(block)));
    }

    /// Detach the session ticket keys, if any are attached.
    pub fn take_ticket_keys(&self) -> Option<Arc<TicketKeyBlock>> {
        self.ticket_keys.swap(None)
    }
}
