//! Packet framing: locating the encrypted region and AAD bounds within an
//! RTP or RTCP packet without a full protocol parser, only the handful of
//! header fields the protect/unprotect pipelines in [`crate::session`]
//! need.
//!
//! Built in place of a reliance on the `rtp`/`rtcp` crates for marshaling;
//! this engine only needs to protect/unprotect, not marshal and unmarshal
//! full RTP/RTCP packets, so it reads just the bytes it needs directly off
//! the wire buffer.

pub mod rtcp;
pub mod rtp;
