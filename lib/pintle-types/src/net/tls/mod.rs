/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod ticket_name;
pub use ticket_name::{TICKET_KEY_NAME_LENGTH, TicketKeyName};

mod ticket;
pub use ticket::{
    TICKET_CIPHER_KEY_LENGTH, TICKET_HMAC_SECRET_LENGTH, TICKET_KEY_BLOCK_MAX_KEYS,
    TICKET_KEY_RECORD_LENGTH, TicketKey, TicketKeyBlock,
};
