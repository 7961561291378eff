/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::CredentialConfig;

mod context;
pub use context::{CredentialContext, ServerCredential};

mod table;
pub use table::{CredentialTable, CredentialTableBuilder};

mod ticket;
pub use ticket::load_ticket_key_file;

pub mod registry;
