/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, LazyLock};

use anyhow::anyhow;
use arc_swap::ArcSwapOption;

use super::CredentialTable;

static ACTIVE_TABLE: LazyLock<ArcSwapOption<CredentialTable>> =
    LazyLock::new(|| ArcSwapOption::new(None));

/// Get the active credential table generation. Lock-free, safe to call from
/// every accept and handshake path.
pub fn load_active() -> Option<Arc<CredentialTable>> {
    ACTIVE_TABLE.load_full()
}

/// Atomically publish a new table generation.
///
/// An invalid table is refused and the previously active generation stays in
/// force. Old generations are freed once the last in-flight connection drops
/// its references.
pub fn publish(table: Arc<CredentialTable>) -> anyhow::Result<()> {
    if !table.is_valid() {
        return Err(anyhow!("refusing to publish an invalid credential table"));
    }
    ACTIVE_TABLE.store(Some(table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CredentialContext, CredentialTableBuilder, ServerCredential};

    #[test]
    fn publish_is_fail_closed() {
        let mut builder = CredentialTableBuilder::new(true);
        builder.set_default(Arc::new(CredentialContext::new(ServerCredential::Tunnel)));
        let good = Arc::new(builder.finish());

        publish(good.clone()).unwrap();
        assert!(Arc::ptr_eq(&load_active().unwrap(), &good));

        let ctx = Arc::new(CredentialContext::new(ServerCredential::Tunnel));
        let mut builder = CredentialTableBuilder::new(true);
        let _ = builder.insert_host("*", &ctx);
        let bad = Arc::new(builder.finish());
        assert!(!bad.is_valid());

        assert!(publish(bad).is_err());
        // the previous generation stays active
        assert!(Arc::ptr_eq(&load_active().unwrap(), &good));
    }
}
