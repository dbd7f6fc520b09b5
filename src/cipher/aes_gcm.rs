//! AES-GCM AEAD cipher (draft-ietf-avtcore-srtp-aes-gcm), used when a
//! policy selects `Aes128Gcm`/`Aes256Gcm`. Unlike AES-ICM, this cipher
//! carries its own authentication tag: no separate `Mac` is used alongside
//! it (see `CryptoPolicy::AEAD_AES_128_GCM`'s `auth: NullAuth`).
//!
//! Adapted from `cipher_aead_aes_gcm.rs`, which wraps the same `aead`/
//! `aes-gcm` detached encrypt/decrypt shape.

use aead::generic_array::GenericArray;
use aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};

use crate::cipher::{AeadCipher, Cipher, CipherId, Direction};
use crate::error::{Error, Result};

const GCM_NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;

enum Inner {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

pub struct AesGcmCipher {
    id: CipherId,
    inner: Inner,
    nonce: Option<[u8; GCM_NONCE_LEN]>,
    aad: Vec<u8>,
    last_tag: Option<[u8; GCM_TAG_LEN]>,
}

impl AesGcmCipher {
    pub fn new(id: CipherId, key: Vec<u8>) -> Result<Self> {
        let inner = match id {
            CipherId::Aes128Gcm => {
                if key.len() != 16 {
                    return Err(Error::BadParam("AES-128-GCM key must be 16 bytes"));
                }
                Inner::Aes128(Aes128Gcm::new(GenericArray::from_slice(&key)))
            }
            CipherId::Aes256Gcm => {
                if key.len() != 32 {
                    return Err(Error::BadParam("AES-256-GCM key must be 32 bytes"));
                }
                Inner::Aes256(Aes256Gcm::new(GenericArray::from_slice(&key)))
            }
            _ => return Err(Error::BadParam("not an AES-GCM cipher id")),
        };
        Ok(AesGcmCipher {
            id,
            inner,
            nonce: None,
            aad: Vec::new(),
            last_tag: None,
        })
    }
}

impl Cipher for AesGcmCipher {
    fn id(&self) -> CipherId {
        self.id
    }

    fn set_iv(&mut self, iv: &[u8], _direction: Direction) -> Result<()> {
        if iv.len() != GCM_NONCE_LEN {
            return Err(Error::BadParam("AES-GCM nonce must be 12 bytes"));
        }
        let mut nonce = [0u8; GCM_NONCE_LEN];
        nonce.copy_from_slice(iv);
        self.nonce = Some(nonce);
        Ok(())
    }

    fn set_aad(&mut self, aad: &[u8]) -> Result<()> {
        self.aad = aad.to_vec();
        Ok(())
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        let nonce = self.nonce.ok_or(Error::NoCtx)?;
        let nonce = GenericArray::from_slice(&nonce);
        let tag = match &self.inner {
            Inner::Aes128(c) => c.encrypt_in_place_detached(nonce, &self.aad, buf),
            Inner::Aes256(c) => c.encrypt_in_place_detached(nonce, &self.aad, buf),
        }
        .map_err(|e| Error::CipherFail(e.to_string()))?;
        let mut stored = [0u8; GCM_TAG_LEN];
        stored.copy_from_slice(&tag);
        self.last_tag = Some(stored);
        Ok(())
    }

    fn decrypt(&mut self, _buf: &mut [u8]) -> Result<()> {
        // GCM's decrypt and tag verification happen in one call (the
        // underlying primitive has no detached "decrypt without verifying"
        // operation). The AEAD pipeline in `session.rs` calls
        // `decrypt_and_verify` directly with the tag read off the wire
        // instead of going through this trait method.
        Err(Error::BadParam(
            "AES-GCM decrypt must go through decrypt_and_verify",
        ))
    }

    fn output(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::BadParam("AES-GCM does not support raw keystream output"))
    }
}

impl AesGcmCipher {
    /// Decrypt `buf` in place and verify `tag` in one call (the AEAD
    /// primitive this crate uses only exposes combined decrypt+verify).
    pub fn decrypt_and_verify(&mut self, buf: &mut [u8], tag: &[u8; GCM_TAG_LEN]) -> Result<()> {
        let nonce = self.nonce.ok_or(Error::NoCtx)?;
        let nonce = GenericArray::from_slice(&nonce);
        let tag_arr = GenericArray::from_slice(tag);
        match &self.inner {
            Inner::Aes128(c) => c.decrypt_in_place_detached(nonce, &self.aad, buf, tag_arr),
            Inner::Aes256(c) => c.decrypt_in_place_detached(nonce, &self.aad, buf, tag_arr),
        }
        .map_err(|_| Error::AuthFail)
    }
}

impl AeadCipher for AesGcmCipher {
    fn get_tag(&mut self, tag: &mut [u8]) -> Result<()> {
        let stored = self.last_tag.ok_or(Error::NoCtx)?;
        if tag.len() != GCM_TAG_LEN {
            return Err(Error::BadParam("GCM tag buffer must be 16 bytes"));
        }
        tag.copy_from_slice(&stored);
        Ok(())
    }

    fn verify_tag(&self, tag: &[u8]) -> bool {
        match self.last_tag {
            Some(stored) => crate::cipher::octet_string_is_eq(&stored, tag) == 0,
            None => false,
        }
    }
}

#[cfg(test)]
mod aes_gcm_test;
