//! RTP header view: base header is 12 bytes, followed by
//! `4 * CC` CSRC bytes and, if the extension bit is set, a 4-byte
//! extension header plus `4 * ext_profile_len` bytes.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

pub const BASE_HEADER_LEN: usize = 12;

pub struct RtpHeaderView {
    pub cc: u8,
    pub has_extension: bool,
    pub sequence_number: u16,
    pub ssrc: u32,
    /// Byte offset where the (possibly encrypted) payload begins.
    pub encrypted_region_start: usize,
}

impl RtpHeaderView {
    /// Parse and validate `buf`. Fails `bad_param` if the computed header
    /// extent would exceed the buffer.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < BASE_HEADER_LEN {
            return Err(Error::BadParam("RTP packet shorter than the base header"));
        }

        let cc = buf[0] & 0x0f;
        let has_extension = buf[0] & 0x10 != 0;
        let sequence_number = BigEndian::read_u16(&buf[2..4]);
        let ssrc = BigEndian::read_u32(&buf[8..12]);

        let mut offset = BASE_HEADER_LEN + 4 * cc as usize;
        if offset > buf.len() {
            return Err(Error::BadParam("RTP CSRC list exceeds packet length"));
        }

        if has_extension {
            if offset + 4 > buf.len() {
                return Err(Error::BadParam("RTP extension header exceeds packet length"));
            }
            let ext_profile_len = BigEndian::read_u16(&buf[offset + 2..offset + 4]) as usize;
            offset += 4 + 4 * ext_profile_len;
            if offset > buf.len() {
                return Err(Error::BadParam("RTP extension body exceeds packet length"));
            }
        }

        Ok(RtpHeaderView {
            cc,
            has_extension,
            sequence_number,
            ssrc,
            encrypted_region_start: offset,
        })
    }

    /// AAD for GCM: the header bytes preceding the encrypted region.
    pub fn aad<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[..self.encrypted_region_start]
    }
}

#[cfg(test)]
mod rtp_test;
