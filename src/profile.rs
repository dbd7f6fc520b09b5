//! Named-profile helpers: map a DTLS-SRTP-style profile name to a
//! [`Policy`]. Adapted from `protection_profile.rs`'s constants and match
//! arms, generalized to the full named-profile set this crate supports.

use crate::error::{Error, Result};
use crate::policy::{CryptoPolicy, Policy, Services, Ssrc};

/// Named protection profiles. `null_sha1_32` is deliberately absent: RFC
/// 3711 requires a nonzero tag length whenever confidentiality is off, so a
/// null cipher paired with a 32-bit tag is rejected rather than represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Aes128CmSha1_80,
    Aes128CmSha1_32,
    NullSha1_80,
    Aes256CmSha1_80,
    Aes256CmSha1_32,
}

impl Profile {
    pub fn from_name(name: &str) -> Result<Profile> {
        match name {
            "aes128_cm_sha1_80" => Ok(Profile::Aes128CmSha1_80),
            "aes128_cm_sha1_32" => Ok(Profile::Aes128CmSha1_32),
            "null_sha1_80" => Ok(Profile::NullSha1_80),
            "aes256_cm_sha1_80" => Ok(Profile::Aes256CmSha1_80),
            "aes256_cm_sha1_32" => Ok(Profile::Aes256CmSha1_32),
            "null_sha1_32" => Err(Error::BadParam(
                "null_sha1_32 is not supported (RFC 3711 compliance)",
            )),
            _ => Err(Error::BadParam("no such SRTP profile")),
        }
    }

    /// The `CryptoPolicy` this profile uses for RTP.
    pub fn rtp_crypto_policy(&self) -> CryptoPolicy {
        match self {
            Profile::Aes128CmSha1_80 => CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
            Profile::Aes128CmSha1_32 => CryptoPolicy::AES_128_CM_HMAC_SHA1_32,
            Profile::NullSha1_80 => CryptoPolicy::NULL_CIPHER_HMAC_SHA1_80,
            Profile::Aes256CmSha1_80 => CryptoPolicy::AES_256_CM_HMAC_SHA1_80,
            Profile::Aes256CmSha1_32 => CryptoPolicy::AES_256_CM_HMAC_SHA1_32,
        }
    }

    /// The `CryptoPolicy` this profile uses for RTCP. 32-bit tag profiles
    /// are silently upgraded to 80-bit for RTCP (RFC 3711 mandates at
    /// least an 80-bit tag for RTCP regardless of the negotiated RTP tag
    /// length).
    pub fn rtcp_crypto_policy(&self) -> CryptoPolicy {
        match self {
            Profile::Aes128CmSha1_32 => CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
            Profile::Aes256CmSha1_32 => CryptoPolicy::AES_256_CM_HMAC_SHA1_80,
            other => other.rtp_crypto_policy(),
        }
    }
}

/// Build a [`Policy`] for `profile`, bound to `ssrc`, with both RTP and
/// RTCP confidentiality+authentication enabled (the common case; callers
/// needing a different service mix construct a `Policy` directly).
pub fn policy_for_profile(
    profile: Profile,
    ssrc: Ssrc,
    master_key: Vec<u8>,
    master_salt: Vec<u8>,
) -> Policy {
    let services = if profile == Profile::NullSha1_80 {
        Services {
            confidentiality: false,
            authentication: true,
        }
    } else {
        Services::CONFIDENTIALITY_AND_AUTH
    };

    // RTCP is always authenticated regardless of the profile's service
    // mask; confidentiality tracks the profile's choice.
    let rtcp_services = Services {
        confidentiality: services.confidentiality,
        authentication: true,
    };

    Policy {
        ssrc,
        rtp: profile.rtp_crypto_policy(),
        rtcp: profile.rtcp_crypto_policy(),
        rtp_services: services,
        rtcp_services,
        master_key,
        master_salt,
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    }
}

#[cfg(test)]
mod profile_test;
