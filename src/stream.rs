//! Stream context: per-SSRC cryptographic state shared (ciphers, MACs,
//! key-usage limit) or owned (replay state, salts) depending on whether
//! the stream is a clone of a template.
//!
//! Adapted from the `Stream` struct shape (`stream.rs`) and the per-SSRC
//! state fields of `SrtpSsrcState`/`SrtcpSsrcState` (`context/mod.rs`),
//! generalized from "one `Context` per direction" to one `StreamContext`
//! holding both RTP and RTCP state.
//!
//! Freeing shared resources only once every clone that references them is
//! gone is normally manual bookkeeping (pointer-comparing against the
//! template before freeing). `Arc` replaces that: a clone's ciphers/MAC/
//! limit are `Arc` handles into the same allocation as the template's, so
//! dropping a clone's `StreamContext` only frees the underlying primitive
//! once every `Arc` (including the template's) has gone away. The "free
//! exactly once" guarantee falls out of ordinary reference counting
//! instead of an explicit pointer comparison.

use std::sync::{atomic, Arc, Mutex};

use crate::cipher::aes_ctr::AesCtrCipher;
use crate::cipher::aes_gcm::AesGcmCipher;
use crate::cipher::hmac_sha1::HmacSha1Mac;
use crate::cipher::null::{NullAuth, NullCipher};
use crate::cipher::{Cipher, Mac};
use crate::error::{Error, Result};
use crate::kdf::{self, LABEL_RTCP_ENCRYPTION, LABEL_RTCP_MSG_AUTH, LABEL_RTCP_SALT};
use crate::kdf::{LABEL_RTP_ENCRYPTION, LABEL_RTP_MSG_AUTH, LABEL_RTP_SALT};
use crate::limit::UsageLimit;
use crate::policy::{AuthKind, CipherKind, CryptoPolicy, Policy, Services};
use crate::replay::rdb::RtcpReplayDb;
use crate::replay::rdbx::ExtendedReplayWindow;

/// Whether a stream has been pinned to sending or receiving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Unknown,
    Sender,
    Receiver,
}

/// Either a non-AEAD cipher behind the `Cipher` trait object, or a
/// concrete AES-GCM cipher. GCM needs `get_tag`/`decrypt_and_verify`,
/// which aren't (and shouldn't be) part of the object-safe `Cipher`
/// trait, so the protect/unprotect pipeline matches on this enum instead
/// of trying to downcast a trait object.
pub enum StreamCipher {
    NonAead(Box<dyn Cipher>),
    Gcm(AesGcmCipher),
}

impl StreamCipher {
    fn from_policy(cp: &CryptoPolicy, key: Vec<u8>) -> Result<Self> {
        Ok(match cp.cipher {
            CipherKind::AesIcm128 | CipherKind::AesIcm192 | CipherKind::AesIcm256 => {
                StreamCipher::NonAead(Box::new(AesCtrCipher::new(cp.cipher, key)?))
            }
            CipherKind::Aes128Gcm | CipherKind::Aes256Gcm => {
                StreamCipher::Gcm(AesGcmCipher::new(cp.cipher, key)?)
            }
            CipherKind::NullCipher => StreamCipher::NonAead(Box::new(NullCipher)),
        })
    }
}

fn mac_from_policy(cp: &CryptoPolicy, key: Vec<u8>) -> Result<Box<dyn Mac>> {
    Ok(match cp.auth {
        AuthKind::HmacSha1 => Box::new(HmacSha1Mac::new(key, cp.auth_tag_len)?),
        AuthKind::NullAuth => Box::new(NullAuth),
    })
}

/// Crypto state shared across a template and its clones: one cipher, one
/// MAC, and the key-usage limit, for one direction (RTP or RTCP).
pub struct SharedCrypto {
    pub cipher: Mutex<StreamCipher>,
    pub mac: Mutex<Box<dyn Mac>>,
}

/// A salt that overwrites itself with zero before being freed. The corpus
/// carries no `zeroize` dependency, so this hand-rolls the same
/// overwrite-then-fence technique rather than introducing one.
pub struct ZeroizingSalt(pub Vec<u8>);

impl std::ops::Deref for ZeroizingSalt {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for ZeroizingSalt {
    fn drop(&mut self) {
        for b in self.0.iter_mut() {
            *b = 0;
        }
        atomic::compiler_fence(atomic::Ordering::SeqCst);
    }
}

/// Per-SSRC cryptographic and replay state for one stream.
pub struct StreamContext {
    pub ssrc: u32,
    pub direction: Direction,
    pub allow_repeat_tx: bool,

    pub rtp: Arc<SharedCrypto>,
    pub rtcp: Arc<SharedCrypto>,
    pub limit: Arc<Mutex<UsageLimit>>,

    pub rtp_salt: ZeroizingSalt,
    pub rtcp_salt: ZeroizingSalt,

    pub rtp_services: Services,
    pub rtcp_services: Services,
    pub rtp_is_aead: bool,
    pub rtcp_is_aead: bool,

    pub rtp_replay: ExtendedReplayWindow,
    pub rtcp_replay: RtcpReplayDb,
}

impl StreamContext {
    /// `alloc` + `init` + `init_keys` combined: build a fresh, independent
    /// `StreamContext`, not a clone, from `policy`.
    ///
    /// Failures during allocation must release everything already
    /// allocated within the call; this function only starts mutating
    /// local state after every fallible step (key derivation, cipher/MAC
    /// construction) has already succeeded, so there is nothing partially
    /// built to roll back. An empty `Err` path is the Rust-native form of
    /// that guarantee.
    pub fn new(policy: &Policy) -> Result<Self> {
        policy.validate()?;
        if !(0..=1).contains(&(policy.allow_repeat_tx as u8)) {
            return Err(Error::BadParam("allow_repeat_tx must be 0 or 1"));
        }

        let ssrc = match policy.ssrc {
            crate::policy::Ssrc::Specific(v) => v,
            _ => 0,
        };

        let (rtp, rtp_salt) = build_shared_crypto(
            &policy.rtp,
            &policy.master_key,
            &policy.master_salt,
            LABEL_RTP_ENCRYPTION,
            LABEL_RTP_MSG_AUTH,
            LABEL_RTP_SALT,
        )?;
        let (rtcp, rtcp_salt) = build_shared_crypto(
            &policy.rtcp,
            &policy.master_key,
            &policy.master_salt,
            LABEL_RTCP_ENCRYPTION,
            LABEL_RTCP_MSG_AUTH,
            LABEL_RTCP_SALT,
        )?;

        let window_size = policy.effective_window_size();

        Ok(StreamContext {
            ssrc,
            direction: Direction::Unknown,
            allow_repeat_tx: policy.allow_repeat_tx,
            rtp: Arc::new(rtp),
            rtcp: Arc::new(rtcp),
            limit: Arc::new(Mutex::new(UsageLimit::with_default_hard_limit())),
            rtp_salt: ZeroizingSalt(rtp_salt),
            rtcp_salt: ZeroizingSalt(rtcp_salt),
            rtp_services: policy.rtp_services,
            rtcp_services: policy.rtcp_services,
            rtp_is_aead: policy.rtp.is_aead(),
            rtcp_is_aead: policy.rtcp.is_aead(),
            rtp_replay: ExtendedReplayWindow::new(window_size)?,
            rtcp_replay: RtcpReplayDb::new(window_size)?,
        })
    }

    /// Clone the template for a newly-seen `ssrc`: ciphers/MAC/limit are
    /// shared by `Arc`, but replay state and salts are independent.
    pub fn clone_for_ssrc(&self, ssrc: u32, direction: Direction) -> Self {
        StreamContext {
            ssrc,
            direction,
            allow_repeat_tx: self.allow_repeat_tx,
            rtp: Arc::clone(&self.rtp),
            rtcp: Arc::clone(&self.rtcp),
            limit: Arc::clone(&self.limit),
            rtp_salt: ZeroizingSalt(self.rtp_salt.0.clone()),
            rtcp_salt: ZeroizingSalt(self.rtcp_salt.0.clone()),
            rtp_services: self.rtp_services,
            rtcp_services: self.rtcp_services,
            rtp_is_aead: self.rtp_is_aead,
            rtcp_is_aead: self.rtcp_is_aead,
            rtp_replay: ExtendedReplayWindow::new(self.rtp_replay.window_size()).expect(
                "window size was already validated when the template was constructed",
            ),
            rtcp_replay: RtcpReplayDb::new(self.rtcp_replay.window_size()).expect(
                "window size was already validated when the template was constructed",
            ),
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self.ssrc, 0) && matches!(self.direction, Direction::Unknown)
    }
}

#[allow(clippy::too_many_arguments)]
fn build_shared_crypto(
    cp: &CryptoPolicy,
    master_key: &[u8],
    master_salt: &[u8],
    label_enc: u8,
    label_auth: u8,
    label_salt: u8,
) -> Result<(SharedCrypto, Vec<u8>)> {
    let base_len = kdf::base_key_len(cp.is_aead(), cp.combined_key_len);
    let salt_len = cp.combined_key_len.saturating_sub(base_len);

    let session_key = kdf::derive(label_enc, master_key, master_salt, base_len)?;
    let session_salt_full = kdf::derive(label_salt, master_key, master_salt, salt_len.max(12))?;
    let mut session_salt = session_salt_full;
    session_salt.truncate(12.min(session_salt.len()));

    let mac = if cp.auth_key_len > 0 {
        let auth_key = kdf::derive(label_auth, master_key, master_salt, cp.auth_key_len)?;
        mac_from_policy(cp, auth_key)?
    } else {
        mac_from_policy(cp, Vec::new())?
    };

    let cipher = StreamCipher::from_policy(cp, session_key)?;

    Ok((
        SharedCrypto {
            cipher: Mutex::new(cipher),
            mac: Mutex::new(mac),
        },
        session_salt,
    ))
}

#[cfg(test)]
mod stream_test;
