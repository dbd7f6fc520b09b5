//! Policy: the immutable per-stream description of ciphers, authenticators,
//! SSRC binding, and security services a [`crate::stream`] is built from.
//!
//! Adapted from `protection_profile.rs`, which packs cipher id and
//! tag-length facts into one small type; `CryptoPolicy` here generalizes
//! that into a standalone value so `Policy` can compose one for RTP and
//! one for RTCP instead of flattening every field onto `Policy` itself.

use crate::error::{Error, Result};
use crate::replay::rdbx::{DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};

/// Cipher identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    AesIcm128,
    AesIcm192,
    AesIcm256,
    Aes128Gcm,
    Aes256Gcm,
    NullCipher,
}

impl CipherKind {
    pub fn is_aead(&self) -> bool {
        matches!(self, CipherKind::Aes128Gcm | CipherKind::Aes256Gcm)
    }
}

/// Authenticator identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    HmacSha1,
    NullAuth,
}

/// Security-service bitmask: confidentiality and authentication, each
/// independently selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Services {
    pub confidentiality: bool,
    pub authentication: bool,
}

impl Services {
    pub const NONE: Services = Services {
        confidentiality: false,
        authentication: false,
    };
    pub const CONFIDENTIALITY_AND_AUTH: Services = Services {
        confidentiality: true,
        authentication: true,
    };
}

/// Cipher + authenticator facts for one direction (RTP or RTCP) of a
/// policy, mirroring how `ProtectionProfile` packs cipher id and tag
/// lengths behind one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoPolicy {
    pub cipher: CipherKind,
    /// Combined cipher-key-plus-salt length, in bytes.
    pub combined_key_len: usize,
    pub auth: AuthKind,
    pub auth_key_len: usize,
    pub auth_tag_len: usize,
}

impl CryptoPolicy {
    pub fn is_aead(&self) -> bool {
        self.cipher.is_aead()
    }

    pub const AES_128_CM_HMAC_SHA1_80: CryptoPolicy = CryptoPolicy {
        cipher: CipherKind::AesIcm128,
        combined_key_len: 30,
        auth: AuthKind::HmacSha1,
        auth_key_len: 20,
        auth_tag_len: 10,
    };

    pub const AES_128_CM_HMAC_SHA1_32: CryptoPolicy = CryptoPolicy {
        auth_tag_len: 4,
        ..CryptoPolicy::AES_128_CM_HMAC_SHA1_80
    };

    pub const AES_256_CM_HMAC_SHA1_80: CryptoPolicy = CryptoPolicy {
        cipher: CipherKind::AesIcm256,
        combined_key_len: 46,
        auth: AuthKind::HmacSha1,
        auth_key_len: 20,
        auth_tag_len: 10,
    };

    pub const AES_256_CM_HMAC_SHA1_32: CryptoPolicy = CryptoPolicy {
        auth_tag_len: 4,
        ..CryptoPolicy::AES_256_CM_HMAC_SHA1_80
    };

    pub const NULL_CIPHER_HMAC_SHA1_80: CryptoPolicy = CryptoPolicy {
        cipher: CipherKind::NullCipher,
        combined_key_len: 30,
        auth: AuthKind::HmacSha1,
        auth_key_len: 20,
        auth_tag_len: 10,
    };

    pub const AEAD_AES_128_GCM: CryptoPolicy = CryptoPolicy {
        cipher: CipherKind::Aes128Gcm,
        combined_key_len: 28,
        auth: AuthKind::NullAuth,
        auth_key_len: 0,
        auth_tag_len: 16,
    };

    pub const AEAD_AES_256_GCM: CryptoPolicy = CryptoPolicy {
        cipher: CipherKind::Aes256Gcm,
        combined_key_len: 44,
        auth: AuthKind::NullAuth,
        auth_key_len: 0,
        auth_tag_len: 16,
    };
}

/// SSRC specifier: tagged as a specific value, a wildcard for any
/// inbound/outbound SSRC (a template), or undefined (always rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ssrc {
    Specific(u32),
    AnyInbound,
    AnyOutbound,
    Undefined,
}

/// Encrypted Key Transport sub-policy: only the hook is acknowledged here,
/// no EKT crypto is implemented. This exists solely so a `Policy` can
/// carry the bit that a real engine would thread through to
/// key-management code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EktPolicy {
    pub spi: u16,
}

/// Per-stream immutable policy.
#[derive(Debug, Clone)]
pub struct Policy {
    pub ssrc: Ssrc,
    pub rtp: CryptoPolicy,
    pub rtcp: CryptoPolicy,
    pub rtp_services: Services,
    pub rtcp_services: Services,
    pub master_key: Vec<u8>,
    pub master_salt: Vec<u8>,
    /// `0` means "use the default window size".
    pub window_size: usize,
    pub ekt: Option<EktPolicy>,
    pub allow_repeat_tx: bool,
}

impl Policy {
    /// Validates the invariants that hold independent of any particular
    /// stream: SSRC must not be `Undefined`, and the window size (if
    /// nonzero) must fall in the allowed range. `allow_repeat_tx` is a
    /// plain `bool` in this API, so the "0 or 1 only" constraint is
    /// enforced by the type itself; there is no third value to reject.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.ssrc, Ssrc::Undefined) {
            return Err(Error::BadParam("ssrc_undefined is not a valid stream ssrc"));
        }
        if self.window_size != 0
            && !(MIN_WINDOW_SIZE..MAX_WINDOW_SIZE).contains(&self.window_size)
        {
            return Err(Error::BadParam("policy window_size out of range"));
        }
        Ok(())
    }

    pub fn effective_window_size(&self) -> usize {
        if self.window_size == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            self.window_size
        }
    }
}
