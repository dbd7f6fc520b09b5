//! HMAC-SHA1 message authenticator, truncatable to the tag
//! length a [`crate::policy::CryptoPolicy`] specifies (80 or 32 bits).
//!
//! Adapted from the `hmac`+`sha1` usage in
//! `cipher/cipher_aes_cm_hmac_sha1/mod.rs`.

use hmac::{Hmac, Mac as HmacMacTrait};
use sha1::Sha1;

use crate::cipher::{AuthId, Mac};
use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

pub struct HmacSha1Mac {
    key: Vec<u8>,
    tag_len: usize,
    state: Option<HmacSha1>,
}

impl HmacSha1Mac {
    pub fn new(key: Vec<u8>, tag_len: usize) -> Result<Self> {
        if tag_len == 0 || tag_len > 20 {
            return Err(Error::BadParam("HMAC-SHA1 tag length must be in 1..=20"));
        }
        Ok(HmacSha1Mac {
            key,
            tag_len,
            state: None,
        })
    }
}

impl Mac for HmacSha1Mac {
    fn id(&self) -> AuthId {
        AuthId::HmacSha1
    }

    fn start(&mut self) {
        self.state = Some(HmacSha1::new_from_slice(&self.key).expect("HMAC accepts any key length"));
    }

    fn update(&mut self, buf: &[u8]) {
        if let Some(mac) = self.state.as_mut() {
            mac.update(buf);
        }
    }

    fn compute(&mut self, extra: &[u8]) -> Vec<u8> {
        let mut mac = self.state.take().unwrap_or_else(|| {
            HmacSha1::new_from_slice(&self.key).expect("HMAC accepts any key length")
        });
        mac.update(extra);
        let full = mac.finalize().into_bytes();
        full[..self.tag_len].to_vec()
    }

    fn tag_length(&self) -> usize {
        self.tag_len
    }

    fn prefix_length(&self) -> usize {
        0
    }

    fn key_length(&self) -> usize {
        self.key.len()
    }
}

#[cfg(test)]
mod hmac_sha1_test;
