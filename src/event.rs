//! Event callbacks reporting replay, collision, and key-usage conditions
//! back to the caller.
//!
//! Modeled as session-scoped configuration rather than a process-wide
//! callback pointer: a `Session` owns an `Option<EventHandler>` and `None`
//! means "no reporting".

/// Events the engine reports to an installed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// An SSRC that was pinned to one direction (sender/receiver) was used
    /// in the other direction.
    SsrcCollision,
    /// A stream's key-usage limit crossed the soft threshold.
    KeySoftLimit,
    /// A stream's key-usage limit was exhausted.
    KeyHardLimit,
    /// A stream's packet index reached its maximum representable value.
    PacketIndexLimit,
}

/// A session-scoped event callback. `None` on the session means no
/// reporting; installing one replaces any previous handler.
pub type EventHandler = Box<dyn FnMut(Event, u32) + Send>;
