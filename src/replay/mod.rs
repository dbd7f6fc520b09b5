//! Replay databases: packet-index reconstruction and a sliding replay
//! window for RTP (48-bit extended index, [`rdbx`]), and a monotonic
//! 31-bit index with lookback for RTCP ([`rdb`]).

pub mod rdb;
pub mod rdbx;

pub use rdb::RtcpReplayDb;
pub use rdbx::ExtendedReplayWindow;
