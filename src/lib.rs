#![allow(dead_code)]

//! A pure Rust SRTP/SRTCP protect and unprotect engine.
//!
//! Given a per-session [`policy::Policy`] (ciphers, authenticators, master
//! key, security services) and a raw RTP or RTCP packet, [`session::Session`]
//! transforms the packet in place to its protected form on the sending side,
//! and validates and recovers the original on the receiving side, per
//! RFC 3711 and the AES-GCM extension (draft-ietf-avtcore-srtp-aes-gcm).
//!
//! The engine is not internally concurrent: a `Session` and its streams are
//! a single-writer data structure. Callers must serialize `protect`/
//! `unprotect`/`add_stream`/`remove_stream` on a given session themselves.

pub mod cipher;
pub mod error;
pub mod event;
pub mod kdf;
pub mod limit;
pub mod packet;
pub mod policy;
pub mod profile;
pub mod replay;
pub mod session;
pub mod stream;

pub use error::{Error, Result};
pub use event::Event;
pub use policy::{CryptoPolicy, Policy, Services, Ssrc};
pub use session::Session;

/// Packed `major << 24 | minor << 16 | micro` version, read from the crate's
/// own `Cargo.toml` version at compile time.
pub fn get_version() -> u32 {
    const V: &str = env!("CARGO_PKG_VERSION");
    let mut parts = V.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let micro = parts.next().unwrap_or(0);
    (major << 24) | (minor << 16) | micro
}

/// Human-readable version string, e.g. `"srtp-engine 0.1.0"`.
pub fn get_version_string() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
