/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

/// Caller supplied per credential settings, read only once attached to a
/// credential context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CredentialConfig {
    name: String,
    ticket_key_file: Option<PathBuf>,
    ticket_keys_required: bool,
}

impl CredentialConfig {
    pub fn new(name: &str) -> Self {
        CredentialConfig {
            name: name.to_string(),
            ticket_key_file: None,
            ticket_keys_required: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_ticket_key_file(&mut self, path: PathBuf) {
        self.ticket_key_file = Some(path);
    }

    #[inline]
    pub fn ticket_key_file(&self) -> Option<&Path> {
        self.ticket_key_file.as_deref()
    }

    /// Make a missing or unreadable ticket key file a hard error for this
    /// credential instead of a logged soft miss.
    pub fn set_ticket_keys_required(&mut self, required: bool) {
        self.ticket_keys_required = required;
    }

    #[inline]
    pub fn ticket_keys_required(&self) -> bool {
        self.ticket_keys_required
    }
}
