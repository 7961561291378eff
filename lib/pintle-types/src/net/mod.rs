/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod host;
pub use host::Host;
pub(crate) use host::normalize_domain;

mod tls;
pub use tls::*;
