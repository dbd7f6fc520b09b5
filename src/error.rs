use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Status codes for the protect/unprotect data path, stable across the API.
///
/// `ok` is simply `Ok(())`/`Ok(T)`; everything else is a variant here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A parameter was self-inconsistent or out of its allowed range
    /// (malformed header, invalid window size, invalid `allow_repeat_tx`).
    #[error("bad parameter: {0}")]
    BadParam(&'static str),

    /// Resource allocation failed while constructing a stream or session.
    #[error("allocation failed: {0}")]
    AllocFail(&'static str),

    /// A stream or cipher/MAC object failed to initialize.
    #[error("initialization failed: {0}")]
    InitFail(&'static str),

    /// No stream exists for the packet's SSRC, and no template is installed.
    #[error("no stream context for this SSRC")]
    NoCtx,

    /// The packet index falls outside the replay window (too old).
    #[error("replayed packet: index is older than the replay window")]
    ReplayOld,

    /// The packet index falls inside the replay window but has already
    /// been seen.
    #[error("replayed packet: index has already been seen")]
    ReplayFail,

    /// The stream's key-usage limit has been exhausted.
    #[error("key usage limit exceeded")]
    KeyExpired,

    /// MAC verification, or (for AEAD) GCM tag verification, failed.
    #[error("authentication failed")]
    AuthFail,

    /// The underlying cipher primitive reported a failure.
    #[error("cipher operation failed: {0}")]
    CipherFail(String),

    /// The packet's header was self-inconsistent (e.g. truncated CSRC/
    /// extension region).
    #[error("could not parse packet header: {0}")]
    ParseErr(&'static str),

    /// The SRTCP trailer's E-bit does not match the configured
    /// confidentiality service.
    #[error("cannot check packet: E-bit does not match configured services")]
    CantCheck,
}
