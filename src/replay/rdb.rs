//! RTCP replay database (RDB): a monotonically increasing 31-bit index per
//! SSRC with a lookback window, distinct from the RTP RDBX because the
//! SRTCP index travels on the wire in full (no rollover reconstruction
//! needed). Adapted from `SrtcpSsrcState`/`MAX_SRTCP_INDEX` in
//! `context/mod.rs`.

use crate::error::{Error, Result};
use crate::replay::rdbx::{DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};

/// SRTCP indices are 31 bits wide.
pub const MAX_SRTCP_INDEX: u32 = (1 << 31) - 1;

#[derive(Debug)]
pub struct RtcpReplayDb {
    window_size: usize,
    highest: Option<u32>,
    mask: Vec<u64>,
}

impl RtcpReplayDb {
    pub fn new(window_size: usize) -> Result<Self> {
        let window_size = if window_size == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            window_size
        };
        if !(MIN_WINDOW_SIZE..MAX_WINDOW_SIZE).contains(&window_size) {
            return Err(Error::BadParam("rtcp replay window size out of range"));
        }
        let words = window_size.div_ceil(64);
        Ok(RtcpReplayDb {
            window_size,
            highest: None,
            mask: vec![0u64; words],
        })
    }

    /// Sender-side: bump the index and return the new value. Fails if it
    /// would overflow past [`MAX_SRTCP_INDEX`], the RTCP analogue of a
    /// key-usage hard limit, reported via `Event::PacketIndexLimit`.
    pub fn increment(&mut self) -> Result<u32> {
        let next = match self.highest {
            None => 0,
            Some(v) => {
                if v >= MAX_SRTCP_INDEX {
                    return Err(Error::KeyExpired);
                }
                v + 1
            }
        };
        self.highest = Some(next);
        self.mask[0] |= 1;
        Ok(next)
    }

    pub fn get_value(&self) -> Option<u32> {
        self.highest
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Receiver-side: replay check without committing.
    pub fn check(&self, idx: u32) -> Result<()> {
        let highest = match self.highest {
            None => return Ok(()),
            Some(h) => h,
        };
        if idx > highest {
            return Ok(());
        }
        let back = (highest - idx) as usize;
        if back >= self.window_size {
            return Err(Error::ReplayOld);
        }
        let word = back / 64;
        let bit = back % 64;
        if self.mask[word] & (1 << bit) != 0 {
            return Err(Error::ReplayFail);
        }
        Ok(())
    }

    /// Receiver-side: commit `idx`. Must only be called after a successful
    /// [`check`](Self::check).
    pub fn add(&mut self, idx: u32) {
        let highest = match self.highest {
            None => {
                self.highest = Some(idx);
                self.mask[0] |= 1;
                return;
            }
            Some(h) => h,
        };

        if idx > highest {
            let shift = (idx - highest) as usize;
            self.shift_left(shift);
            self.highest = Some(idx);
            self.mask[0] |= 1;
        } else {
            let back = (highest - idx) as usize;
            let word = back / 64;
            let bit = back % 64;
            self.mask[word] |= 1 << bit;
        }
    }

    fn shift_left(&mut self, n: usize) {
        if n >= self.window_size {
            for w in self.mask.iter_mut() {
                *w = 0;
            }
            return;
        }
        let word_shift = n / 64;
        let bit_shift = (n % 64) as u32;
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
mod rdb_test;
