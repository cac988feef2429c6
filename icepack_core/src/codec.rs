//! Result decoders.
//!
//! A solver client is generic over its [`Decoder`], so the result type is
//! fixed when the client is built and every `get` returns that type.

use std::fmt;
use std::marker::PhantomData;

use prost::Message;

use crate::errors::{CoreError, CoreResult};

/// Turns solution bytes into a typed result.
pub trait Decoder: Send + Sync {
    type Output;

    fn decode(&self, bytes: &[u8]) -> CoreResult<Self::Output>;
}

/// Decodes any protobuf message type.
pub struct ProstDecoder<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> ProstDecoder<M> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for ProstDecoder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for ProstDecoder<M> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for ProstDecoder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProstDecoder")
            .field("message", &std::any::type_name::<M>())
            .finish()
    }
}

impl<M: Message + Default> Decoder for ProstDecoder<M> {
    type Output = M;

    fn decode(&self, bytes: &[u8]) -> CoreResult<M> {
        M::decode(bytes).map_err(|e| {
            CoreError::decode(format!(
                "solution is not a valid {}: {e}",
                std::any::type_name::<M>()
            ))
        })
    }
}

/// Decodes with a caller-supplied function.
pub struct FnDecoder<F, T> {
    decode: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> FnDecoder<F, T>
where
    F: Fn(&[u8]) -> CoreResult<T> + Send + Sync,
{
    pub fn new(decode: F) -> Self {
        Self {
            decode,
            _marker: PhantomData,
        }
    }
}

impl<F, T> Decoder for FnDecoder<F, T>
where
    F: Fn(&[u8]) -> CoreResult<T> + Send + Sync,
{
    type Output = T;

    fn decode(&self, bytes: &[u8]) -> CoreResult<T> {
        (self.decode)(bytes)
    }
}

/// Hands the solution bytes back untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl Decoder for RawDecoder {
    type Output = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> CoreResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}
