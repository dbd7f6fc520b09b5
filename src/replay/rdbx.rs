//! RTP extended-index database (RDBX): reconstructs the 48-bit extended
//! sequence number (`ROC << 16 | SEQ`) from the 16-bit wire sequence number
//! across rollovers, and maintains a sliding replay window over it.
//!
//! Adapted from the rollover-estimation arithmetic in `context/mod.rs`
//! (`SrtpSsrcState::next_rollover_count`/`update_rollover_count`),
//! generalized into a standalone `estimate`/`check`/`add` value object
//! decoupled from any particular session or stream type.

use crate::error::{Error, Result};

pub const MIN_WINDOW_SIZE: usize = 64;
/// Exclusive upper bound: `window_size` must be strictly less than this.
pub const MAX_WINDOW_SIZE: usize = 32768;
pub const DEFAULT_WINDOW_SIZE: usize = 128;

const SEQ_NUM_MEDIAN: i32 = 1 << 15;
const SEQ_NUM_MAX: i32 = u16::MAX as i32;

/// Sliding-window replay detector keyed by the 48-bit extended RTP packet
/// index.
#[derive(Debug)]
pub struct ExtendedReplayWindow {
    window_size: usize,
    /// `None` until the first packet has been committed.
    highest: Option<u64>,
    /// Bit `i` set means index `highest - i` has already been committed.
    /// Bit 0 is always the highest index itself once set.
    mask: Vec<u64>,
}

impl ExtendedReplayWindow {
    /// `window_size == 0` is normalized to [`DEFAULT_WINDOW_SIZE`];
    /// otherwise it must fall in `[MIN_WINDOW_SIZE, MAX_WINDOW_SIZE)`.
    pub fn new(window_size: usize) -> Result<Self> {
        let window_size = if window_size == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            window_size
        };
        if !(MIN_WINDOW_SIZE..MAX_WINDOW_SIZE).contains(&window_size) {
            return Err(Error::BadParam("rtp replay window size out of range"));
        }
        let words = window_size.div_ceil(64);
        Ok(ExtendedReplayWindow {
            window_size,
            highest: None,
            mask: vec![0u64; words],
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Given the 16-bit sequence number from the wire, reconstruct the most
    /// likely 48-bit extended index by comparing against the current
    /// high-water mark, and return `(estimated_index, delta)` where `delta`
    /// is the signed distance `estimated_index - highest`.
    ///
    /// Before any packet has been committed, the estimate is simply the
    /// wire sequence number with ROC 0.
    pub fn estimate(&self, seq: u16) -> (u64, i64) {
        let highest = match self.highest {
            None => return (seq as u64, seq as i64),
            Some(h) => h,
        };

        let local_roc = (highest >> 16) as u32;
        let local_seq = highest as u16;

        let mut guess_roc = local_roc;
        let s = seq as i32;
        let local = local_seq as i32;
        let raw_diff = s - local;

        let diff = if highest > SEQ_NUM_MEDIAN as u64 {
            if local < SEQ_NUM_MEDIAN {
                if raw_diff > SEQ_NUM_MEDIAN {
                    guess_roc = local_roc.wrapping_sub(1);
                    raw_diff - (SEQ_NUM_MAX + 1)
                } else {
                    raw_diff
                }
            } else if local - SEQ_NUM_MEDIAN > s {
                guess_roc = local_roc.wrapping_add(1);
                raw_diff + (SEQ_NUM_MAX + 1)
            } else {
                raw_diff
            }
        } else {
            raw_diff
        };

        let est = ((guess_roc as u64) << 16) | seq as u64;
        (est, diff as i64)
    }

    /// Check whether `delta` (as returned by [`estimate`](Self::estimate))
    /// represents a packet that is acceptable: not a replay, and not older
    /// than the window.
    pub fn check(&self, delta: i64) -> Result<()> {
        if self.highest.is_none() || delta > 0 {
            return Ok(());
        }
        let back = (-delta) as u64;
        if back as usize >= self.window_size {
            return Err(Error::ReplayOld);
        }
        let word = (back / 64) as usize;
        let bit = back % 64;
        if self.mask[word] & (1 << bit) != 0 {
            return Err(Error::ReplayFail);
        }
        Ok(())
    }

    /// Commit the packet at `delta` relative to the current high-water
    /// mark, advancing the high-water mark and shifting the window if
    /// `delta > 0`. Must only be called after a successful [`check`].
    pub fn add(&mut self, est: u64, delta: i64) {
        let highest = match self.highest {
            None => {
                self.highest = Some(est);
                self.mask[0] |= 1;
                return;
            }
            Some(h) => h,
        };

        if delta > 0 {
            self.shift_left(delta as u64);
            self.highest = Some(est);
            self.mask[0] |= 1;
        } else {
            let _ = highest;
            let back = (-delta) as u64;
            let word = (back / 64) as usize;
            let bit = back % 64;
            self.mask[word] |= 1 << bit;
        }
    }

    fn shift_left(&mut self, n: u64) {
        if n as usize >= self.window_size {
            for w in self.mask.iter_mut() {
                *w = 0;
            }
            return;
        }
        let word_shift = (n / 64) as usize;
        let bit_shift = n % 64;
        let len = self.mask.len();

        if bit_shift == 0 {
            for i in (0..len).rev() {
                self.mask[i] = if i >= word_shift {
                    self.mask[i - word_shift]
                } else {
                    0
                };
            }
        } else {
            for i in (0..len).rev() {
                let lo = if i >= word_shift {
                    self.mask[i - word_shift] << bit_shift
                } else {
                    0
                };
                let hi = if i >= word_shift + 1 {
                    self.mask[i - word_shift - 1] >> (64 - bit_shift)
                } else {
                    0
                };
                self.mask[i] = lo | hi;
            }
        }
    }
}

#[cfg(test)]
mod rdbx_test;
