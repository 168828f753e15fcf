//! Value codecs.
//!
//! A codec maps between a user-level value and the byte sequence that gets
//! encrypted and persisted. Encoder and decoder must be exact inverses for
//! every value the caller stores; a decode failure surfaces as
//! [`CoreError::Encoding`](crate::CoreError::Encoding).
//!
//! Codecs are fixed at mapping construction. Swapping the pair after
//! entries have been written would silently reinterpret stored bytes, so
//! the API deliberately offers no way to do it.

use crate::error::{CoreError, CoreResult};
use std::marker::PhantomData;

/// Maps between user values and stored byte sequences.
pub trait EntryCodec {
    /// The user-level value type.
    type Value;

    /// Encodes a value into bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode(&self, value: &Self::Value) -> CoreResult<Vec<u8>>;

    /// Decodes bytes back into a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding.
    fn decode(&self, bytes: &[u8]) -> CoreResult<Self::Value>;
}

/// The default codec: values are UTF-8 strings stored verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl EntryCodec for Utf8Codec {
    type Value = String;

    fn encode(&self, value: &Self::Value) -> CoreResult<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> CoreResult<Self::Value> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| CoreError::encoding(format!("stored bytes are not valid UTF-8: {e}")))
    }
}

/// Identity codec for callers that store raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl EntryCodec for BytesCodec {
    type Value = Vec<u8>;

    fn encode(&self, value: &Self::Value) -> CoreResult<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> CoreResult<Self::Value> {
        Ok(bytes.to_vec())
    }
}

/// A codec built from an injected pair of pure functions.
///
/// This is the pluggable encoder/decoder contract: callers bring their own
/// serialization (JSON, CBOR, whatever) as two closures that must be exact
/// inverses.
///
/// # Example
///
/// ```
/// use vaultmap_core::{CoreError, EntryCodec, FnCodec};
///
/// let codec = FnCodec::new(
///     |n: &u64| Ok(n.to_be_bytes().to_vec()),
///     |bytes: &[u8]| {
///         let array: [u8; 8] = bytes
///             .try_into()
///             .map_err(|_| CoreError::encoding("expected 8 bytes"))?;
///         Ok(u64::from_be_bytes(array))
///     },
/// );
/// let bytes = codec.encode(&42).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), 42);
/// ```
pub struct FnCodec<T, E, D>
where
    E: Fn(&T) -> CoreResult<Vec<u8>>,
    D: Fn(&[u8]) -> CoreResult<T>,
{
    encode: E,
    decode: D,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E, D> FnCodec<T, E, D>
where
    E: Fn(&T) -> CoreResult<Vec<u8>>,
    D: Fn(&[u8]) -> CoreResult<T>,
{
    /// Creates a codec from an encoder/decoder pair.
    pub fn new(encode: E, decode: D) -> Self {
        Self {
            encode,
            decode,
            _marker: PhantomData,
        }
    }
}

impl<T, E, D> EntryCodec for FnCodec<T, E, D>
where
    E: Fn(&T) -> CoreResult<Vec<u8>>,
    D: Fn(&[u8]) -> CoreResult<T>,
{
    type Value = T;

    fn encode(&self, value: &Self::Value) -> CoreResult<Vec<u8>> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> CoreResult<Self::Value> {
        (self.decode)(bytes)
    }
}
