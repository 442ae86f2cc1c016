//! Packed fixed-width records for persisting engine state.
//!
//! Every record is 32 bytes, big-endian:
//!
//! * balance: `[margin sign | position sign | margin (120 bits) | position (120 bits)]`
//! * index / funding rate: `[timestamp (u32) | sign | value (216 bits)]`
//!
//! An account record is its local index record followed by its balance
//! record. Values that do not fit are rejected with `Error::Overflow`;
//! nothing is ever truncated.

use num_bigint::BigUint;
use crate::error::{Error, Result};
use crate::types::balance::Balance;
use crate::types::index::Index;
use crate::types::signed::SignedValue;

pub const RECORD_LEN: usize = 32;
pub const ACCOUNT_RECORD_LEN: usize = 2 * RECORD_LEN;

pub const BALANCE_FIELD_BYTES: usize = 15;
pub const INDEX_FIELD_BYTES: usize = 27;

const POSITIVE: u8 = 1;
const NEGATIVE: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRecord {
    pub local_index: Index,
    pub balance: Balance,
}

/// Largest magnitude a field of `bytes` bytes can hold.
pub fn max_magnitude(bytes: usize) -> BigUint {
    (BigUint::from(1u32) << (8 * bytes)) - 1u32
}

fn write_magnitude(out: &mut [u8], value: &BigUint, field: &str) -> Result<()> {
    let bytes = value.to_bytes_be();
    if bytes.len() > out.len() {
        return Err(Error::Overflow {
            operation: format!("{} exceeds {} bits", field, out.len() * 8),
        });
    }
    let offset = out.len() - bytes.len();
    out[..offset].fill(0);
    out[offset..].copy_from_slice(&bytes);
    Ok(())
}

fn sign_byte(value: &SignedValue) -> u8 {
    if value.is_positive() { POSITIVE } else { NEGATIVE }
}

fn read_signed(sign: u8, magnitude: &[u8]) -> Result<SignedValue> {
    let is_positive = match sign {
        POSITIVE => true,
        NEGATIVE => false,
        other => {
            return Err(Error::SerializationError(format!("invalid sign byte {}", other)));
        }
    };
    // Constructor canonicalises a stored negative zero.
    Ok(SignedValue::new(BigUint::from_bytes_be(magnitude), is_positive))
}

fn check_len(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::InvalidRecordLength {
            expected,
            found: bytes.len(),
        });
    }
    Ok(())
}

pub fn encode_balance(balance: &Balance) -> Result<[u8; RECORD_LEN]> {
    let mut out = [0u8; RECORD_LEN];
    out[0] = sign_byte(&balance.margin);
    out[1] = sign_byte(&balance.position);
    write_magnitude(&mut out[2..2 + BALANCE_FIELD_BYTES], balance.margin.magnitude(), "margin")?;
    write_magnitude(&mut out[2 + BALANCE_FIELD_BYTES..], balance.position.magnitude(), "position")?;
    Ok(out)
}

pub fn decode_balance(bytes: &[u8]) -> Result<Balance> {
    check_len(bytes, RECORD_LEN)?;
    let margin = read_signed(bytes[0], &bytes[2..2 + BALANCE_FIELD_BYTES])?;
    let position = read_signed(bytes[1], &bytes[2 + BALANCE_FIELD_BYTES..])?;
    Ok(Balance::new(margin, position))
}

pub fn encode_index(index: &Index) -> Result<[u8; RECORD_LEN]> {
    let timestamp = u32::try_from(index.timestamp).map_err(|_| Error::Overflow {
        operation: "index timestamp exceeds 32 bits".to_string(),
    })?;

    let mut out = [0u8; RECORD_LEN];
    out[..4].copy_from_slice(&timestamp.to_be_bytes());
    out[4] = sign_byte(&index.value);
    write_magnitude(&mut out[5..], index.value.magnitude(), "index value")?;
    Ok(out)
}

pub fn decode_index(bytes: &[u8]) -> Result<Index> {
    check_len(bytes, RECORD_LEN)?;
    let mut timestamp = [0u8; 4];
    timestamp.copy_from_slice(&bytes[..4]);
    let value = read_signed(bytes[4], &bytes[5..])?;
    Ok(Index::new(u64::from(u32::from_be_bytes(timestamp)), value))
}

pub fn encode_account(local_index: &Index, balance: &Balance) -> Result<[u8; ACCOUNT_RECORD_LEN]> {
    let mut out = [0u8; ACCOUNT_RECORD_LEN];
    out[..RECORD_LEN].copy_from_slice(&encode_index(local_index)?);
    out[RECORD_LEN..].copy_from_slice(&encode_balance(balance)?);
    Ok(out)
}

pub fn decode_account(bytes: &[u8]) -> Result<AccountRecord> {
    check_len(bytes, ACCOUNT_RECORD_LEN)?;
    Ok(AccountRecord {
        local_index: decode_index(&bytes[..RECORD_LEN])?,
        balance: decode_balance(&bytes[RECORD_LEN..])?,
    })
}
