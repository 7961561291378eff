/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::Context;
use log::warn;

use pintle_types::net::TicketKeyBlock;

/// Load session ticket keys from the file at `path`.
///
/// The file is a sequence of 48 byte records with no header or padding. A
/// missing or unreadable file is a soft miss: the credential simply gets no
/// ticket keys. A readable file with malformed contents is a configuration
/// error.
pub fn load_ticket_key_file(path: &Path) -> anyhow::Result<Option<TicketKeyBlock>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("unable to read ticket key file {}: {e}", path.display());
            return Ok(None);
        }
    };
    let block = TicketKeyBlock::parse(&data)
        .with_context(|| format!("invalid ticket key file {}", path.display()))?;
    Ok(Some(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x42u8; 96]).unwrap();

        let block = load_ticket_key_file(file.path()).unwrap().unwrap();
        assert_eq!(block.count(), 2);
        assert_eq!(block.get(0).unwrap().name().as_ref(), &[0x42u8; 16]);
    }

    #[test]
    fn missing_file_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-keys");
        assert!(load_ticket_key_file(&path).unwrap().is_none());
    }

    #[test]
    fn bad_length_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 100]).unwrap();
        assert!(load_ticket_key_file(file.path()).is_err());
    }
}
