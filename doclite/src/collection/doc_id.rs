use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use crate::ID_GENERATOR;
use std::fmt::{Debug, Display, Write};

/// A unique identifier for documents in a collection.
///
/// A `DocId` is an opaque 12-byte value rendered as 24 lowercase hex
/// characters. Generated ids start with an 8-byte snowflake (timestamp, node id
/// and sequence) followed by a 4-byte per-process salt, so ids created in the
/// same process sort in creation order.
///
/// Ids can also be supplied by the caller, typically parsed from hex when a
/// document references documents in another collection:
///
/// ```rust,ignore
/// use doclite::collection::DocId;
///
/// let id = DocId::from_hex("552bc0f7bbcdf26a32e99954")?;
/// assert_eq!(id.to_string(), "552bc0f7bbcdf26a32e99954");
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocId {
    bytes: [u8; 12],
}

impl DocId {
    /// Generates a new unique `DocId`.
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&ID_GENERATOR.get_id().to_be_bytes());
        bytes[8..].copy_from_slice(&ID_GENERATOR.salt());
        DocId { bytes }
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        DocId { bytes }
    }

    /// Parses a `DocId` from its 24 character hex form.
    pub fn from_hex(hex: &str) -> DocliteResult<DocId> {
        if hex.len() != 24 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::error!("Invalid document id {}: expected 24 hex characters", hex);
            return Err(DocliteError::new(
                &format!("Invalid document id {}: expected 24 hex characters", hex),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; 12];
        for (byte, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
            *byte = (hex_digit(pair[0]) << 4) | hex_digit(pair[1]);
        }
        Ok(DocId { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(24);
        for byte in &self.bytes {
            // writing into a String cannot fail
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }
}

impl Default for DocId {
    fn default() -> Self {
        DocId::new()
    }
}

impl Debug for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocId({})", self.to_hex())
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Value of an ASCII hex digit already checked with `is_ascii_hexdigit`.
fn hex_digit(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
