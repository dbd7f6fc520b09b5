//! Null cipher and null authenticator: pass data through
//! unchanged, for policies that want an unencrypted or unauthenticated
//! stream (e.g. `NULL_CIPHER_HMAC_SHA1_80`, or GCM's `auth: NullAuth` since
//! GCM carries its own tag).
//!
//! No reference implementation carries a null cipher or null authenticator;
//! these are written directly from the `Cipher`/`Mac` trait contracts so
//! that `protection_profile.rs`'s null-cipher and GCM-with-no-separate-MAC
//! profiles have something to construct.

use crate::cipher::{AuthId, Cipher, CipherId, Direction, Mac};
use crate::error::Result;

#[derive(Default)]
pub struct NullCipher;

impl Cipher for NullCipher {
    fn id(&self) -> CipherId {
        CipherId::NullCipher
    }

    fn set_iv(&mut self, _iv: &[u8], _direction: Direction) -> Result<()> {
        Ok(())
    }

    fn encrypt(&mut self, _buf: &mut [u8]) -> Result<()> {
        Ok(())
    }

    fn decrypt(&mut self, _buf: &mut [u8]) -> Result<()> {
        Ok(())
    }

    fn output(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.iter_mut().for_each(|b| *b = 0);
        Ok(())
    }
}

#[derive(Default)]
pub struct NullAuth;

impl Mac for NullAuth {
    fn id(&self) -> AuthId {
        AuthId::NullAuth
    }

    fn start(&mut self) {}

    fn update(&mut self, _buf: &[u8]) {}

    fn compute(&mut self, _extra: &[u8]) -> Vec<u8> {
        Vec::new()
    }

    fn tag_length(&self) -> usize {
        0
    }

    fn prefix_length(&self) -> usize {
        0
    }

    fn key_length(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod null_test;
