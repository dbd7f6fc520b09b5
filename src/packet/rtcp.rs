//! RTCP framing helpers: the trailer word (E-bit + 31-bit index) and the
//! fixed 8-byte RTCP header length.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

pub const OCTETS_IN_RTCP_HEADER: usize = 8;

const E_BIT: u32 = 0x8000_0000;
const INDEX_MASK: u32 = 0x7fff_ffff;

/// Decoded SRTCP trailer word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    pub encrypted: bool,
    pub index: u32,
}

impl Trailer {
    pub fn new(encrypted: bool, index: u32) -> Self {
        Trailer {
            encrypted,
            index: index & INDEX_MASK,
        }
    }

    pub fn to_word(self) -> u32 {
        (if self.encrypted { E_BIT } else { 0 }) | (self.index & INDEX_MASK)
    }

    pub fn from_word(word: u32) -> Self {
        Trailer {
            encrypted: word & E_BIT != 0,
            index: word & INDEX_MASK,
        }
    }

    pub fn read(buf: &[u8]) -> Result<Self> {
        if buf.len() != 4 {
            return Err(Error::BadParam("RTCP trailer must be exactly 4 bytes"));
        }
        Ok(Self::from_word(BigEndian::read_u32(buf)))
    }

    pub fn write(self, buf: &mut [u8]) -> Result<()> {
        if buf.len() != 4 {
            return Err(Error::BadParam("RTCP trailer must be exactly 4 bytes"));
        }
        BigEndian::write_u32(buf, self.to_word());
        Ok(())
    }
}

pub fn ssrc(buf: &[u8]) -> Result<u32> {
    if buf.len() < OCTETS_IN_RTCP_HEADER {
        return Err(Error::BadParam("RTCP packet shorter than its header"));
    }
    Ok(BigEndian::read_u32(&buf[4..8]))
}

#[cfg(test)]
mod rtcp_test;
