//! Cipher/MAC abstraction: a uniform contract over AES-CTR, AES-GCM,
//! HMAC-SHA1, and null cipher/auth, so the protect/unprotect pipelines in
//! [`crate::session`] are primitive-agnostic.
//!
//! Adapted from the reference `cipher/mod.rs` trait (the doc comment on
//! AEAD tag placement below is adapted from it), kept narrow so the data
//! path stays primitive-agnostic: init/set_iv/set_aad/encrypt/decrypt/
//! output/get_tag and nothing else.

pub mod aes_ctr;
pub mod aes_gcm;
pub mod hmac_sha1;
pub mod null;

use subtle::ConstantTimeEq;

use crate::error::Result;
pub use crate::policy::{AuthKind as AuthId, CipherKind as CipherId};

/// Which direction a cipher has been keyed for. AES-CTR's keystream does
/// not actually depend on this (encryption and decryption are the same
/// XOR), and this crate's AES-GCM cipher ignores it too (the pipeline picks
/// encrypt-or-decrypt explicitly); it exists so `set_iv(iv, direction)` has
/// a uniform contract across primitives that might need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A pluggable cipher primitive. All ciphers (AEAD or not) implement the
/// same narrow set of operations; `set_aad`/`get_tag` are no-ops/errors for
/// non-AEAD ciphers.
///
/// NOTE: the MAC tag and the AEAD auth tag land in different positions in
/// SRTCP. In non-AEAD ciphers, the authentication tag is placed *after*
/// the trailer (E-bit + SRTCP index). In AEAD ciphers, the AEAD tag is
/// embedded in the ciphertext, *before* the trailer. See RFC 7714.
pub trait Cipher: Send {
    fn id(&self) -> CipherId;

    /// Seed the cipher's IV/nonce for the next `encrypt`/`decrypt`/`output`
    /// call. `direction` is accepted uniformly across primitives even
    /// though today's implementations don't need it (see [`Direction`]).
    fn set_iv(&mut self, iv: &[u8], direction: Direction) -> Result<()>;

    /// Set additional authenticated data. No-op for non-AEAD ciphers.
    fn set_aad(&mut self, _aad: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Encrypt `buf` in place.
    fn encrypt(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Decrypt `buf` in place. For AEAD ciphers this does *not* verify the
    /// tag; see [`get_tag`](Cipher::get_tag)/[`AeadCipher::decrypt_and_verify`].
    fn decrypt(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Produce `buf.len()` bytes of raw keystream (used to fill a MAC's
    /// prefix region). Unsupported by AEAD ciphers and the null cipher.
    fn output(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Extension for AEAD ciphers: produces/consumes the authentication tag
/// directly, since non-AEAD ciphers have no tag of their own (that's the
/// MAC's job).
pub trait AeadCipher: Cipher {
    /// Write the tag generated by the most recent `encrypt` call into
    /// `tag` (`tag.len()` must equal the cipher's tag length).
    fn get_tag(&mut self, tag: &mut [u8]) -> Result<()>;

    /// Verify `tag` against `buf`'s ciphertext (set via a prior
    /// `decrypt`), in constant time.
    fn verify_tag(&self, tag: &[u8]) -> bool;
}

/// A pluggable MAC primitive.
pub trait Mac: Send {
    fn id(&self) -> AuthId;
    fn start(&mut self);
    fn update(&mut self, buf: &[u8]);
    /// Feed `extra` (e.g. the 4-byte ROC for SRTP) after the buffer
    /// accumulated via `update`, and return the (possibly truncated) tag.
    fn compute(&mut self, extra: &[u8]) -> Vec<u8>;
    fn tag_length(&self) -> usize;
    /// Length of the keystream prefix this MAC needs before its input
    /// (nonzero only for universal-hash MACs, none of which this crate
    /// implements; both `HmacSha1` and `NullAuth` return 0).
    fn prefix_length(&self) -> usize;
    fn key_length(&self) -> usize;
}

/// Constant-time comparison with a deliberately sharp convention: returns
/// **non-zero iff the strings differ** (zero means equal). Reversing the
/// sense here is a security bug, so every call site in this crate treats a
/// zero return as "tags match" and nothing else.
pub fn octet_string_is_eq(a: &[u8], b: &[u8]) -> u8 {
    if a.len() != b.len() {
        return 1;
    }
    1u8 ^ a.ct_eq(b).unwrap_u8()
}

#[cfg(test)]
mod cipher_test;
