/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;

use super::{TICKET_KEY_NAME_LENGTH, TicketKeyName};

pub const TICKET_HMAC_SECRET_LENGTH: usize = 16;
pub const TICKET_CIPHER_KEY_LENGTH: usize = 16;
pub const TICKET_KEY_RECORD_LENGTH: usize =
    TICKET_KEY_NAME_LENGTH + TICKET_HMAC_SECRET_LENGTH + TICKET_CIPHER_KEY_LENGTH;
pub const TICKET_KEY_BLOCK_MAX_KEYS: usize = 64;

/// One session ticket key record: public key name, HMAC secret, cipher key.
pub struct TicketKey {
    name: TicketKeyName,
    hmac_secret: [u8; TICKET_HMAC_SECRET_LENGTH],
    cipher_key: [u8; TICKET_CIPHER_KEY_LENGTH],
}

impl TicketKey {
    pub fn new(
        name: [u8; TICKET_KEY_NAME_LENGTH],
        hmac_secret: [u8; TICKET_HMAC_SECRET_LENGTH],
        cipher_key: [u8; TICKET_CIPHER_KEY_LENGTH],
    ) -> Self {
        TicketKey {
            name: name.into(),
            hmac_secret,
            cipher_key,
        }
    }

    fn zeroed() -> Self {
        TicketKey {
            name: [0u8; TICKET_KEY_NAME_LENGTH].into(),
            hmac_secret: [0u8; TICKET_HMAC_SECRET_LENGTH],
            cipher_key: [0u8; TICKET_CIPHER_KEY_LENGTH],
        }
    }

    /// the record should be of size `TICKET_KEY_RECORD_LENGTH`
    fn from_record(record: &[u8]) -> Self {
        let mut name = [0u8; TICKET_KEY_NAME_LENGTH];
        name.copy_from_slice(&record[..TICKET_KEY_NAME_LENGTH]);

        let mut hmac_secret = [0u8; TICKET_HMAC_SECRET_LENGTH];
        let offset = TICKET_KEY_NAME_LENGTH;
        hmac_secret.copy_from_slice(&record[offset..offset + TICKET_HMAC_SECRET_LENGTH]);

        let mut cipher_key = [0u8; TICKET_CIPHER_KEY_LENGTH];
        let offset = offset + TICKET_HMAC_SECRET_LENGTH;
        cipher_key.copy_from_slice(&record[offset..offset + TICKET_CIPHER_KEY_LENGTH]);

        TicketKey {
            name: name.into(),
            hmac_secret,
            cipher_key,
        }
    }

    #[inline]
    pub fn name(&self) -> &TicketKeyName {
        &self.name
    }

    #[inline]
    pub fn hmac_secret(&self) -> &[u8; TICKET_HMAC_SECRET_LENGTH] {
        &self.hmac_secret
    }

    #[inline]
    pub fn cipher_key(&self) -> &[u8; TICKET_CIPHER_KEY_LENGTH] {
        &self.cipher_key
    }
}

/// Session ticket keys for one server credential.
///
/// A block is owned by exactly one credential context: it can not be cloned,
/// ownership only moves, and dropping it is the paired free.
pub struct TicketKeyBlock {
    keys: Box<[TicketKey]>,
}

impl TicketKeyBlock {
    /// Allocate a zero-filled block for exactly `count` keys.
    pub fn new(count: usize) -> anyhow::Result<Self> {
        if count == 0 {
            return Err(anyhow!("a ticket key block needs at least one key"));
        }
        if count > TICKET_KEY_BLOCK_MAX_KEYS {
            return Err(anyhow!(
                "too many ticket keys: {count}, the limit is {TICKET_KEY_BLOCK_MAX_KEYS}"
            ));
        }
        count
            .checked_mul(TICKET_KEY_RECORD_LENGTH)
            .ok_or_else(|| anyhow!("ticket key block size overflow"))?;

        let keys = (0..count).map(|_| TicketKey::zeroed()).collect();
        Ok(TicketKeyBlock { keys })
    }

    /// Parse concatenated 48 byte records: 16 byte key name, 16 byte HMAC
    /// secret, 16 byte cipher key. Record order is kept.
    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        if data.is_empty() {
            return Err(anyhow!("empty ticket key data"));
        }
        if data.len() % TICKET_KEY_RECORD_LENGTH != 0 {
            return Err(anyhow!(
                "ticket key data length {} is not a multiple of {TICKET_KEY_RECORD_LENGTH}",
                data.len()
            ));
        }
        let count = data.len() / TICKET_KEY_RECORD_LENGTH;
        if count > TICKET_KEY_BLOCK_MAX_KEYS {
            return Err(anyhow!(
                "too many ticket keys: {count}, the limit is {TICKET_KEY_BLOCK_MAX_KEYS}"
            ));
        }

        let keys = data
            .chunks_exact(TICKET_KEY_RECORD_LENGTH)
            .map(TicketKey::from_record)
            .collect();
        Ok(TicketKeyBlock { keys })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&TicketKey> {
        self.keys.get(i)
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize) -> Option<&mut TicketKey> {
        self.keys.get_mut(i)
    }

    #[inline]
    pub fn keys(&self) -> std::slice::Iter<'_, TicketKey> {
        self.keys.iter()
    }

    /// Find the key with the given name, comparing names in constant time.
    pub fn lookup(&self, name: &[u8]) -> Option<&TicketKey> {
        self.keys.iter().find(|k| k.name.constant_time_eq(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u8) -> [u8; TICKET_KEY_RECORD_LENGTH] {
        let mut r = [0u8; TICKET_KEY_RECORD_LENGTH];
        for (i, v) in r.iter_mut().enumerate() {
            *v = seed.wrapping_add(i as u8);
        }
        r
    }

    #[test]
    fn parse_round_trip() {
        let mut data = Vec::new();
        data.extend_from_slice(&record(1));
        data.extend_from_slice(&record(101));

        let block = TicketKeyBlock::parse(&data).unwrap();
        assert_eq!(block.count(), 2);

        let r1 = record(1);
        let first = block.get(0).unwrap();
        assert_eq!(first.name().as_ref(), &r1[..16]);
        assert_eq!(first.hmac_secret(), &r1[16..32]);
        assert_eq!(first.cipher_key(), &r1[32..48]);

        let r2 = record(101);
        let second = block.get(1).unwrap();
        assert_eq!(second.name().as_ref(), &r2[..16]);

        assert!(block.get(2).is_none());
        assert_eq!(block.keys().count(), 2);
    }

    #[test]
    fn parse_bad_length() {
        assert!(TicketKeyBlock::parse(&[]).is_err());
        assert!(TicketKeyBlock::parse(&[0u8; 100]).is_err());
        assert!(TicketKeyBlock::parse(&[0u8; 47]).is_err());
        assert!(
            TicketKeyBlock::parse(&vec![
                0u8;
                (TICKET_KEY_BLOCK_MAX_KEYS + 1) * TICKET_KEY_RECORD_LENGTH
            ])
            .is_err()
        );
    }

    #[test]
    fn alloc() {
        assert!(TicketKeyBlock::new(0).is_err());
        assert!(TicketKeyBlock::new(TICKET_KEY_BLOCK_MAX_KEYS + 1).is_err());

        let mut block = TicketKeyBlock::new(2).unwrap();
        assert_eq!(block.count(), 2);
        *block.get_mut(0).unwrap() = TicketKey::new([3u8; 16], [4u8; 16], [5u8; 16]);
        assert_eq!(block.get(0).unwrap().cipher_key(), &[5u8; 16]);
    }

    #[test]
    fn lookup_by_name() {
        let mut data = Vec::new();
        data.extend_from_slice(&record(1));
        data.extend_from_slice(&record(101));
        let block = TicketKeyBlock::parse(&data).unwrap();

        let r2 = record(101);
        let found = block.lookup(&r2[..16]).unwrap();
        assert_eq!(found.hmac_secret(), &r2[16..32]);

        assert!(block.lookup(&[0xffu8; 16]).is_none());
        assert!(block.lookup(&r2[..8]).is_none());
    }
}
