//! Ordered binary persistence stream
//!
//! Records are written as a flat sequence of fields and must be read back
//! in exactly the same order. Each field is encoded with `bincode`; there is
//! no framing or versioning beyond what callers write themselves.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::foundation::math::{Mat3d, Vec3d};

/// Persistence stream errors
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Field could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Field decoded but its value is not acceptable here
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Appends fields to an in-memory record
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any serde value
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerializeError> {
        bincode::serialize_into(&mut self.buffer, value)?;
        Ok(())
    }

    /// Append a flag
    pub fn bool(&mut self, value: bool) -> Result<(), SerializeError> {
        self.write(&value)
    }

    /// Append an unsigned integer
    pub fn u32(&mut self, value: u32) -> Result<(), SerializeError> {
        self.write(&value)
    }

    /// Append an unsigned integer that may be absent
    pub fn optional_u32(&mut self, value: Option<u32>) -> Result<(), SerializeError> {
        self.write(&value)
    }

    /// Append a double
    pub fn f64(&mut self, value: f64) -> Result<(), SerializeError> {
        self.write(&value)
    }

    /// Append a string
    pub fn string(&mut self, value: &str) -> Result<(), SerializeError> {
        self.write(value)
    }

    /// Append a double precision vector
    pub fn vector3d(&mut self, value: &Vec3d) -> Result<(), SerializeError> {
        self.write(value)
    }

    /// Append a double precision 3x3 matrix
    pub fn matrix3x3d(&mut self, value: &Mat3d) -> Result<(), SerializeError> {
        self.write(value)
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Finish and take the bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Reads fields back from a record, front to back
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    remaining: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Read from a byte slice
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { remaining: bytes }
    }

    /// Read the next field as any serde value
    ///
    /// Decoding is bounded by the bytes left in the record, so a corrupt
    /// length prefix fails instead of allocating what it claims.
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T, SerializeError> {
        let limit = u64::try_from(self.remaining.len()).unwrap_or(u64::MAX);
        Ok(bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(limit)
            .deserialize_from(&mut self.remaining)?)
    }

    /// Read a flag
    pub fn bool(&mut self) -> Result<bool, SerializeError> {
        self.read()
    }

    /// Read an unsigned integer
    pub fn u32(&mut self) -> Result<u32, SerializeError> {
        self.read()
    }

    /// Read an unsigned integer that may be absent
    pub fn optional_u32(&mut self) -> Result<Option<u32>, SerializeError> {
        self.read()
    }

    /// Read a double
    pub fn f64(&mut self) -> Result<f64, SerializeError> {
        self.read()
    }

    /// Read a string
    pub fn string(&mut self) -> Result<String, SerializeError> {
        self.read()
    }

    /// Read a double precision vector
    pub fn vector3d(&mut self) -> Result<Vec3d, SerializeError> {
        self.read()
    }

    /// Read a double precision 3x3 matrix
    pub fn matrix3x3d(&mut self) -> Result<Mat3d, SerializeError> {
        self.read()
    }

    /// True once every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_read_back_in_order() {
        let mut writer = Writer::new();
        writer.bool(true).unwrap();
        writer.bool(false).unwrap();
        writer.string("ship.craft").unwrap();
        writer.vector3d(&Vec3d::new(1.0e12, -2.5, 3.0)).unwrap();
        writer.optional_u32(Some(4)).unwrap();
        writer.optional_u32(None).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert!(reader.bool().unwrap());
        assert!(!reader.bool().unwrap());
        assert_eq!(reader.string().unwrap(), "ship.craft");
        assert_eq!(reader.vector3d().unwrap(), Vec3d::new(1.0e12, -2.5, 3.0));
        assert_eq!(reader.optional_u32().unwrap(), Some(4));
        assert_eq!(reader.optional_u32().unwrap(), None);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_truncated_record_fails() {
        let mut writer = Writer::new();
        writer.string("probe").unwrap();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes[..bytes.len() - 2]);
        assert!(matches!(reader.string(), Err(SerializeError::Codec(_))));
    }

    #[test]
    fn test_oversized_length_prefix_fails() {
        let mut writer = Writer::new();
        writer.write(&(u64::MAX / 2)).unwrap();
        writer.string("tail").unwrap();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert!(matches!(reader.string(), Err(SerializeError::Codec(_))));
    }
}
