//! AES-ICM (counter mode) cipher, used both to encrypt RTP/RTCP
//! payloads and, via [`Cipher::output`], to fill a MAC's keystream prefix.
//!
//! Adapted from `cipher_aes_cm_hmac_sha1/ctrcipher.rs`, which wraps an
//! `aes`/`ctr` keystream the same way; key length selects the AES variant
//! exactly as there.

use aes::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use aes::{Aes128, Aes192, Aes256};

use crate::cipher::{Cipher, CipherId, Direction};
use crate::error::{Error, Result};

type Ctr128BeAes128 = ctr::Ctr128BE<Aes128>;
type Ctr128BeAes192 = ctr::Ctr128BE<Aes192>;
type Ctr128BeAes256 = ctr::Ctr128BE<Aes256>;

enum Keystream {
    Aes128(Ctr128BeAes128),
    Aes192(Ctr128BeAes192),
    Aes256(Ctr128BeAes256),
}

impl Keystream {
    fn apply(&mut self, buf: &mut [u8]) {
        match self {
            Keystream::Aes128(c) => c.apply_keystream(buf),
            Keystream::Aes192(c) => c.apply_keystream(buf),
            Keystream::Aes256(c) => c.apply_keystream(buf),
        }
    }

    fn seek(&mut self, pos: u64) {
        match self {
            Keystream::Aes128(c) => c.seek(pos),
            Keystream::Aes192(c) => c.seek(pos),
            Keystream::Aes256(c) => c.seek(pos),
        }
    }
}

pub struct AesCtrCipher {
    id: CipherId,
    key: Vec<u8>,
    stream: Option<Keystream>,
}

impl AesCtrCipher {
    pub fn new(id: CipherId, key: Vec<u8>) -> Result<Self> {
        let expect_len = match id {
            CipherId::AesIcm128 => 16,
            CipherId::AesIcm192 => 24,
            CipherId::AesIcm256 => 32,
            _ => return Err(Error::BadParam("not an AES-ICM cipher id")),
        };
        if key.len() != expect_len {
            return Err(Error::BadParam("AES-ICM key has the wrong length"));
        }
        Ok(AesCtrCipher {
            id,
            key,
            stream: None,
        })
    }
}

impl Cipher for AesCtrCipher {
    fn id(&self) -> CipherId {
        self.id
    }

    fn set_iv(&mut self, iv: &[u8], _direction: Direction) -> Result<()> {
        if iv.len() != 16 {
            return Err(Error::BadParam("AES-ICM IV must be 16 bytes"));
        }
        self.stream = Some(match self.id {
            CipherId::AesIcm128 => Keystream::Aes128(Ctr128BeAes128::new(
                self.key.as_slice().into(),
                iv.into(),
            )),
            CipherId::AesIcm192 => Keystream::Aes192(Ctr128BeAes192::new(
                self.key.as_slice().into(),
                iv.into(),
            )),
            CipherId::AesIcm256 => Keystream::Aes256(Ctr128BeAes256::new(
                self.key.as_slice().into(),
                iv.into(),
            )),
            _ => unreachable!("constructor rejects non-ICM ids"),
        });
        Ok(())
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NoCtx)?;
        stream.apply(buf);
        Ok(())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        // CTR mode: encryption and decryption are the same XOR.
        self.encrypt(buf)
    }

    fn output(&mut self, buf: &mut [u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NoCtx)?;
        buf.iter_mut().for_each(|b| *b = 0);
        stream.apply(buf);
        Ok(())
    }
}

impl AesCtrCipher {
    /// Reset the keystream position to the start of the IV's block, used
    /// when a MAC's prefix generation via [`Cipher::output`] must not
    /// disturb the keystream the following `encrypt`/`decrypt` call needs.
    pub fn rewind(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NoCtx)?;
        stream.seek(0u64);
        Ok(())
    }
}

#[cfg(test)]
mod aes_ctr_test;
