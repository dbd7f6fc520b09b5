//! Session registry and protect/unprotect pipelines.
//!
//! Adapted from the shape of `session/mod.rs` (one registry owning a set
//! of per-SSRC streams) and the encrypt/decrypt method split in
//! `context/srtp.rs`/`context/srtcp.rs` (RDBX-then-cipher ordering,
//! rollover-count handling before ciphertext operations). The reference
//! `Session` additionally owns a live transport (`Conn`) and runs its
//! demux loop on `tokio`; neither is carried forward here, since this
//! engine is scoped to synchronous protect/unprotect over caller-owned
//! buffers, with no socket ownership.

use std::sync::{Arc, Mutex};

use crate::cipher::{Cipher, Direction as CipherDirection};
use crate::error::{Error, Result};
use crate::event::{Event, EventHandler};
use crate::kdf;
use crate::limit::{UsageLimit, UsageOutcome};
use crate::packet::rtcp::{Trailer, OCTETS_IN_RTCP_HEADER};
use crate::packet::rtp::RtpHeaderView;
use crate::policy::{Policy, Services, Ssrc};
use crate::replay::rdb::RtcpReplayDb;
use crate::stream::{Direction, SharedCrypto, StreamContext, StreamCipher};

/// A session owns zero or more SSRC-specific streams plus at most one
/// template stream (installed from an `AnyInbound`/`AnyOutbound` policy),
/// and dispatches `protect`/`unprotect` calls to the right one, cloning
/// the template the first time a new SSRC is observed.
pub struct Session {
    streams: Vec<StreamContext>,
    template: Option<StreamContext>,
    event_handler: Option<EventHandler>,
}

impl Session {
    /// `create`: build a session from a policy list. On any
    /// failure the partially-built `Session` is simply dropped. Rust's
    /// ownership model makes "roll back the whole session" the default,
    /// not something dealloc must orchestrate by hand.
    pub fn create(policies: Vec<Policy>) -> Result<Self> {
        let mut session = Session {
            streams: Vec::new(),
            template: None,
            event_handler: None,
        };
        for policy in policies {
            session.add_stream(&policy)?;
        }
        Ok(session)
    }

    pub fn set_event_handler(&mut self, handler: EventHandler) {
        self.event_handler = Some(handler);
    }

    /// `add_stream`: a `Specific` SSRC is prepended to the
    /// stream list; `AnyInbound`/`AnyOutbound` installs the template (at
    /// most one may be installed). `Undefined` is rejected.
    pub fn add_stream(&mut self, policy: &Policy) -> Result<()> {
        let stream = StreamContext::new(policy)?;
        match policy.ssrc {
            Ssrc::Specific(_) => self.streams.insert(0, stream),
            Ssrc::AnyInbound | Ssrc::AnyOutbound => {
                if self.template.is_some() {
                    return Err(Error::BadParam(
                        "a session may install at most one template stream",
                    ));
                }
                self.template = Some(stream);
            }
            Ssrc::Undefined => return Err(Error::BadParam("ssrc_undefined is not a valid stream ssrc")),
        }
        Ok(())
    }

    /// `remove_stream`: this crate treats a packet's parsed
    /// SSRC as already being the wire value every stream stores, so no
    /// separate host/network conversion is modeled.
    pub fn remove_stream(&mut self, ssrc: u32) -> Result<()> {
        match self.streams.iter().position(|s| s.ssrc == ssrc) {
            Some(i) => {
                self.streams.remove(i);
                Ok(())
            }
            None => Err(Error::BadParam("no stream with that SSRC")),
        }
    }

    pub fn get_stream(&self, ssrc: u32) -> Option<&StreamContext> {
        self.streams.iter().find(|s| s.ssrc == ssrc)
    }

    fn emit(&mut self, event: Event, ssrc: u32) {
        log::trace!("srtp event {:?} on ssrc {:08x}", event, ssrc);
        if let Some(handler) = self.event_handler.as_mut() {
            handler(event, ssrc);
        }
    }

    // ---- RTP --------------------------------------------------------

    /// Resolve (or clone-from-template) the stream index for an outbound
    /// RTP packet, pinning/checking its direction as sender.
    fn resolve_rtp_sender(&mut self, ssrc: u32) -> Result<usize> {
        if let Some(i) = self.streams.iter().position(|s| s.ssrc == ssrc) {
            match self.streams[i].direction {
                Direction::Unknown => self.streams[i].direction = Direction::Sender,
                Direction::Sender => {}
                Direction::Receiver => self.emit(Event::SsrcCollision, ssrc),
            }
            return Ok(i);
        }
        let template = self.template.as_ref().ok_or(Error::NoCtx)?;
        let cloned = template.clone_for_ssrc(ssrc, Direction::Sender);
        log::trace!("srtp session cloned new rtp sender stream ssrc={:08x}", ssrc);
        self.streams.insert(0, cloned);
        Ok(0)
    }

    pub fn protect_rtp(&mut self, pkt: &mut Vec<u8>) -> Result<()> {
        let header = RtpHeaderView::parse(pkt)?;
        let ssrc = header.ssrc;
        let enc_start = header.encrypted_region_start;
        let idx = self.resolve_rtp_sender(ssrc)?;

        if self.streams[idx].rtp_is_aead {
            return self.protect_rtp_gcm(idx, pkt, enc_start, header.sequence_number);
        }

        let outcome = self.streams[idx].limit.lock().unwrap().consume();
        match outcome {
            UsageOutcome::HardLimitReached => {
                self.emit(Event::KeyHardLimit, ssrc);
                return Err(Error::KeyExpired);
            }
            UsageOutcome::SoftLimitCrossed => self.emit(Event::KeySoftLimit, ssrc),
            _ => {}
        }

        let (est, delta) = self.streams[idx].rtp_replay.estimate(header.sequence_number);
        if let Err(e) = self.streams[idx].rtp_replay.check(delta) {
            if !(self.streams[idx].allow_repeat_tx && e == Error::ReplayFail) {
                return Err(e);
            }
        }
        self.streams[idx].rtp_replay.add(est, delta);

        let salt = self.streams[idx].rtp_salt.0.clone();
        let iv = kdf::build_rtp_ctr_iv(ssrc, est, &salt);
        let services = self.streams[idx].rtp_services;
        let rtp = Arc::clone(&self.streams[idx].rtp);

        let mut cipher = rtp.cipher.lock().unwrap();
        let mut mac = rtp.mac.lock().unwrap();
        let c = as_non_aead(&mut cipher)?;
        c.set_iv(&iv, CipherDirection::Encrypt)?;

        let mac_started = emit_mac_prefix(c, &mut **mac)?;

        if services.confidentiality {
            c.encrypt(&mut pkt[enc_start..])?;
        }

        if services.authentication {
            if !mac_started {
                mac.start();
            }
            mac.update(pkt);
            let roc = ((est >> 16) as u32).to_be_bytes();
            let tag = mac.compute(&roc);
            pkt.extend_from_slice(&tag);
        }

        Ok(())
    }

    fn protect_rtp_gcm(
        &mut self,
        idx: usize,
        pkt: &mut Vec<u8>,
        enc_start: usize,
        seq: u16,
    ) -> Result<()> {
        let ssrc = self.streams[idx].ssrc;

        let outcome = self.streams[idx].limit.lock().unwrap().consume();
        match outcome {
            UsageOutcome::HardLimitReached => {
                self.emit(Event::KeyHardLimit, ssrc);
                return Err(Error::KeyExpired);
            }
            UsageOutcome::SoftLimitCrossed => self.emit(Event::KeySoftLimit, ssrc),
            _ => {}
        }

        let (est, delta) = self.streams[idx].rtp_replay.estimate(seq);
        if let Err(e) = self.streams[idx].rtp_replay.check(delta) {
            if !(self.streams[idx].allow_repeat_tx && e == Error::ReplayFail) {
                return Err(e);
            }
        }
        self.streams[idx].rtp_replay.add(est, delta);

        let salt = self.streams[idx].rtp_salt.0.clone();
        let roc = (est >> 16) as u32;
        let nonce = kdf::build_rtp_gcm_nonce(ssrc, roc, seq, &salt);
        let rtp = Arc::clone(&self.streams[idx].rtp);
        let mut cipher = rtp.cipher.lock().unwrap();
        let gcm = as_gcm(&mut cipher)?;

        gcm.set_iv(&nonce, CipherDirection::Encrypt)?;
        let aad: Vec<u8> = pkt[..enc_start].to_vec();
        gcm.set_aad(&aad)?;
        gcm.encrypt(&mut pkt[enc_start..])?;
        let mut tag = [0u8; 16];
        gcm.get_tag(&mut tag)?;
        pkt.extend_from_slice(&tag);

        Ok(())
    }

    /// Verifies (and, on success, decrypts) an inbound RTP packet before
    /// ever registering a stream for an SSRC this session hasn't seen
    /// before. For a known SSRC, verification runs against that stream's
    /// own crypto state. For an unknown SSRC, it runs directly against the
    /// template's shared cipher/MAC/limit and a scratch replay estimate;
    /// `clone_for_ssrc` and the registry insert only happen once that
    /// verification has already succeeded, so a packet with a spoofed
    /// SSRC and an invalid tag never creates a live stream entry.
    pub fn unprotect_rtp(&mut self, pkt: &mut Vec<u8>) -> Result<()> {
        let header = RtpHeaderView::parse(pkt)?;
        let ssrc = header.ssrc;
        let seq = header.sequence_number;
        let enc_start = header.encrypted_region_start;

        match self.streams.iter().position(|s| s.ssrc == ssrc) {
            Some(idx) => {
                let (est, delta) = self.streams[idx].rtp_replay.estimate(seq);
                self.streams[idx].rtp_replay.check(delta)?;

                let is_aead = self.streams[idx].rtp_is_aead;
                let rtp = Arc::clone(&self.streams[idx].rtp);
                let limit = Arc::clone(&self.streams[idx].limit);
                let salt = self.streams[idx].rtp_salt.0.clone();

                let body_len = if is_aead {
                    decrypt_and_verify_rtp_gcm(&rtp, &limit, &salt, ssrc, seq, est, enc_start, pkt)?
                } else {
                    verify_and_decrypt_rtp_nonaead(&rtp, &limit, &salt, ssrc, est, enc_start, pkt)?
                };

                self.finish_rtp_unprotect(idx, ssrc, est, delta)?;
                pkt.truncate(body_len);
                Ok(())
            }
            None => {
                let template = self.template.as_ref().ok_or(Error::NoCtx)?;
                let est = seq as u64;
                let delta = seq as i64;
                let is_aead = template.rtp_is_aead;
                let rtp = Arc::clone(&template.rtp);
                let limit = Arc::clone(&template.limit);
                let salt = template.rtp_salt.0.clone();

                let body_len = if is_aead {
                    decrypt_and_verify_rtp_gcm(&rtp, &limit, &salt, ssrc, seq, est, enc_start, pkt)?
                } else {
                    verify_and_decrypt_rtp_nonaead(&rtp, &limit, &salt, ssrc, est, enc_start, pkt)?
                };

                let cloned = template.clone_for_ssrc(ssrc, Direction::Unknown);
                log::trace!("srtp session cloned new rtp receiver stream ssrc={:08x}", ssrc);
                self.streams.insert(0, cloned);
                self.finish_rtp_unprotect(0, ssrc, est, delta)?;
                pkt.truncate(body_len);
                Ok(())
            }
        }
    }

    fn finish_rtp_unprotect(
        &mut self,
        idx: usize,
        ssrc: u32,
        est: u64,
        delta: i64,
    ) -> Result<()> {
        match self.streams[idx].direction {
            Direction::Unknown => self.streams[idx].direction = Direction::Receiver,
            Direction::Receiver => {}
            Direction::Sender => self.emit(Event::SsrcCollision, ssrc),
        }
        self.streams[idx].rtp_replay.add(est, delta);
        Ok(())
    }

    // ---- RTCP -------------------------------------------------------

    fn resolve_rtcp_sender(&mut self, ssrc: u32) -> Result<usize> {
        if let Some(i) = self.streams.iter().position(|s| s.ssrc == ssrc) {
            match self.streams[i].direction {
                Direction::Unknown => self.streams[i].direction = Direction::Sender,
                Direction::Sender => {}
                Direction::Receiver => self.emit(Event::SsrcCollision, ssrc),
            }
            return Ok(i);
        }
        let template = self.template.as_ref().ok_or(Error::NoCtx)?;
        let cloned = template.clone_for_ssrc(ssrc, Direction::Sender);
        log::trace!("srtp session cloned new rtcp sender stream ssrc={:08x}", ssrc);
        self.streams.insert(0, cloned);
        Ok(0)
    }

    pub fn protect_rtcp(&mut self, pkt: &mut Vec<u8>) -> Result<()> {
        let ssrc = crate::packet::rtcp::ssrc(pkt)?;
        let idx = self.resolve_rtcp_sender(ssrc)?;

        if self.streams[idx].rtcp_is_aead {
            return self.protect_rtcp_gcm(idx, pkt, ssrc);
        }

        let index = self.streams[idx].rtcp_replay.increment().map_err(|e| {
            self.emit(Event::PacketIndexLimit, ssrc);
            e
        })?;

        let encrypt = self.streams[idx].rtcp_services.confidentiality;
        let trailer = Trailer::new(encrypt, index);

        let salt = self.streams[idx].rtcp_salt.0.clone();
        let iv = kdf::build_rtcp_ctr_iv(ssrc, index, &salt);
        let rtcp = Arc::clone(&self.streams[idx].rtcp);
        let mut cipher = rtcp.cipher.lock().unwrap();
        let mut mac = rtcp.mac.lock().unwrap();
        let c = as_non_aead(&mut cipher)?;
        c.set_iv(&iv, CipherDirection::Encrypt)?;

        let mac_started = emit_mac_prefix(c, &mut **mac)?;

        if encrypt {
            c.encrypt(&mut pkt[OCTETS_IN_RTCP_HEADER..])?;
        }

        let mut trailer_bytes = [0u8; 4];
        trailer.write(&mut trailer_bytes)?;
        pkt.extend_from_slice(&trailer_bytes);

        if !mac_started {
            mac.start();
        }
        mac.update(pkt);
        let tag = mac.compute(&[]);
        pkt.extend_from_slice(&tag);

        Ok(())
    }

    fn protect_rtcp_gcm(&mut self, idx: usize, pkt: &mut Vec<u8>, ssrc: u32) -> Result<()> {
        let index = self.streams[idx].rtcp_replay.increment()?;
        let encrypt = self.streams[idx].rtcp_services.confidentiality;

        let salt = self.streams[idx].rtcp_salt.0.clone();
        let nonce = kdf::build_rtcp_gcm_nonce(ssrc, index, &salt);
        let rtcp = Arc::clone(&self.streams[idx].rtcp);
        let mut cipher = rtcp.cipher.lock().unwrap();
        let gcm = as_gcm(&mut cipher)?;
        gcm.set_iv(&nonce, CipherDirection::Encrypt)?;

        let trailer = Trailer::new(encrypt, index);
        let mut trailer_bytes = [0u8; 4];
        trailer.write(&mut trailer_bytes)?;

        let aad = if encrypt {
            pkt[..OCTETS_IN_RTCP_HEADER].to_vec()
        } else {
            pkt.clone()
        };
        let mut aad_with_trailer = aad;
        aad_with_trailer.extend_from_slice(&trailer_bytes);
        gcm.set_aad(&aad_with_trailer)?;

        if encrypt {
            gcm.encrypt(&mut pkt[OCTETS_IN_RTCP_HEADER..])?;
        } else {
            // Authenticate-only: advance the GCM state with an empty
            // plaintext so `get_tag` still reflects the AAD above.
            gcm.encrypt(&mut [])?;
        }
        let mut tag = [0u8; 16];
        gcm.get_tag(&mut tag)?;

        pkt.extend_from_slice(&tag);
        pkt.extend_from_slice(&trailer_bytes);

        Ok(())
    }

    /// Same verify-before-register discipline as [`Self::unprotect_rtp`],
    /// for RTCP: an unknown SSRC is checked against the template's own
    /// `rtcp_replay` (always in its untouched, `highest == None` state, so
    /// checking it directly is equivalent to checking a fresh clone) and
    /// shared cipher/MAC, and only cloned into the registry once that
    /// check and the tag/AEAD verification both succeed.
    pub fn unprotect_rtcp(&mut self, pkt: &mut Vec<u8>) -> Result<()> {
        if pkt.len() < OCTETS_IN_RTCP_HEADER + 4 {
            return Err(Error::BadParam("RTCP packet shorter than header + trailer"));
        }
        let ssrc = crate::packet::rtcp::ssrc(pkt)?;

        match self.streams.iter().position(|s| s.ssrc == ssrc) {
            Some(idx) => {
                let is_aead = self.streams[idx].rtcp_is_aead;
                let rtcp = Arc::clone(&self.streams[idx].rtcp);
                let salt = self.streams[idx].rtcp_salt.0.clone();
                let services = self.streams[idx].rtcp_services;

                let (trailer, end) = if is_aead {
                    decrypt_and_verify_rtcp_gcm(&rtcp, &salt, services, &self.streams[idx].rtcp_replay, ssrc, pkt)?
                } else {
                    verify_and_decrypt_rtcp(&rtcp, &salt, services, &self.streams[idx].rtcp_replay, ssrc, pkt)?
                };

                self.finish_rtcp_unprotect(idx, ssrc, trailer.index);
                pkt.truncate(end);
                Ok(())
            }
            None => {
                let template = self.template.as_ref().ok_or(Error::NoCtx)?;
                let is_aead = template.rtcp_is_aead;
                let rtcp = Arc::clone(&template.rtcp);
                let salt = template.rtcp_salt.0.clone();
                let services = template.rtcp_services;

                let (trailer, end) = if is_aead {
                    decrypt_and_verify_rtcp_gcm(&rtcp, &salt, services, &template.rtcp_replay, ssrc, pkt)?
                } else {
                    verify_and_decrypt_rtcp(&rtcp, &salt, services, &template.rtcp_replay, ssrc, pkt)?
                };

                let cloned = template.clone_for_ssrc(ssrc, Direction::Unknown);
                log::trace!("srtp session cloned new rtcp receiver stream ssrc={:08x}", ssrc);
                self.streams.insert(0, cloned);
                self.finish_rtcp_unprotect(0, ssrc, trailer.index);
                pkt.truncate(end);
                Ok(())
            }
        }
    }

    fn finish_rtcp_unprotect(&mut self, idx: usize, ssrc: u32, index: u32) {
        match self.streams[idx].direction {
            Direction::Unknown => self.streams[idx].direction = Direction::Receiver,
            Direction::Receiver => {}
            Direction::Sender => self.emit(Event::SsrcCollision, ssrc),
        }
        self.streams[idx].rtcp_replay.add(index);
    }
}

fn as_non_aead(sc: &mut StreamCipher) -> Result<&mut dyn Cipher> {
    match sc {
        StreamCipher::NonAead(c) => Ok(c.as_mut()),
        StreamCipher::Gcm(_) => Err(Error::BadParam("internal: expected a non-AEAD cipher")),
    }
}

fn as_gcm(sc: &mut StreamCipher) -> Result<&mut crate::cipher::aes_gcm::AesGcmCipher> {
    match sc {
        StreamCipher::Gcm(g) => Ok(g),
        StreamCipher::NonAead(_) => Err(Error::BadParam("internal: expected an AES-GCM cipher")),
    }
}

/// Verify and decrypt an inbound non-AEAD RTP packet in place, against
/// `rtp`/`limit` directly rather than through a `StreamContext` index, so
/// the same call works whether `rtp`/`limit` belong to an established
/// stream or to a not-yet-cloned template. Returns the plaintext length
/// (the packet minus its auth tag) on success; the caller truncates.
fn verify_and_decrypt_rtp_nonaead(
    rtp: &Arc<SharedCrypto>,
    limit: &Arc<Mutex<UsageLimit>>,
    salt: &[u8],
    ssrc: u32,
    est: u64,
    enc_start: usize,
    pkt: &mut [u8],
) -> Result<usize> {
    let mut cipher = rtp.cipher.lock().unwrap();
    let mut mac = rtp.mac.lock().unwrap();
    let tag_len = mac.tag_length();
    if pkt.len() < enc_start + tag_len {
        return Err(Error::BadParam("RTP packet shorter than its auth tag"));
    }
    let body_len = pkt.len() - tag_len;

    let iv = kdf::build_rtp_ctr_iv(ssrc, est, salt);
    let c = as_non_aead(&mut cipher)?;
    c.set_iv(&iv, CipherDirection::Decrypt)?;

    let mac_started = emit_mac_prefix(c, &mut **mac)?;
    if !mac_started {
        mac.start();
    }
    mac.update(&pkt[..body_len]);
    let roc = ((est >> 16) as u32).to_be_bytes();
    let computed = mac.compute(&roc);
    let wire_tag = &pkt[body_len..];
    if crate::cipher::octet_string_is_eq(&computed, wire_tag) != 0 {
        return Err(Error::AuthFail);
    }

    limit.lock().unwrap().consume();

    let c = as_non_aead(&mut cipher)?;
    c.decrypt(&mut pkt[enc_start..body_len])?;

    Ok(body_len)
}

/// AEAD counterpart of [`verify_and_decrypt_rtp_nonaead`]: a single
/// `decrypt_and_verify` call does both steps atomically, so there is no
/// separate tag-check-then-decrypt split here.
fn decrypt_and_verify_rtp_gcm(
    rtp: &Arc<SharedCrypto>,
    limit: &Arc<Mutex<UsageLimit>>,
    salt: &[u8],
    ssrc: u32,
    seq: u16,
    est: u64,
    enc_start: usize,
    pkt: &mut [u8],
) -> Result<usize> {
    if pkt.len() < enc_start + 16 {
        return Err(Error::BadParam("RTP/GCM packet shorter than its tag"));
    }
    let body_len = pkt.len() - 16;
    let mut tag = [0u8; 16];
    tag.copy_from_slice(&pkt[body_len..]);

    let roc = (est >> 16) as u32;
    let nonce = kdf::build_rtp_gcm_nonce(ssrc, roc, seq, salt);
    let mut cipher = rtp.cipher.lock().unwrap();
    let gcm = as_gcm(&mut cipher)?;
    gcm.set_iv(&nonce, CipherDirection::Decrypt)?;
    let aad: Vec<u8> = pkt[..enc_start].to_vec();
    gcm.set_aad(&aad)?;
    gcm.decrypt_and_verify(&mut pkt[enc_start..body_len], &tag)?;
    drop(cipher);

    limit.lock().unwrap().consume();

    Ok(body_len)
}

/// Verify and decrypt an inbound non-AEAD RTCP packet in place, against
/// `rtcp`/`services`/`replay_check` directly so the same call works for an
/// established stream or a not-yet-cloned template. Returns the parsed
/// trailer and the truncation boundary (auth tag and trailer stripped) on
/// success; the caller both commits `trailer.index` into its own replay
/// state and truncates.
fn verify_and_decrypt_rtcp(
    rtcp: &Arc<SharedCrypto>,
    salt: &[u8],
    services: Services,
    replay_check: &RtcpReplayDb,
    ssrc: u32,
    pkt: &mut [u8],
) -> Result<(Trailer, usize)> {
    let mut cipher = rtcp.cipher.lock().unwrap();
    let mut mac = rtcp.mac.lock().unwrap();
    let tag_len = mac.tag_length();
    if pkt.len() < OCTETS_IN_RTCP_HEADER + tag_len + 4 {
        return Err(Error::BadParam("RTCP packet shorter than header + tag + trailer"));
    }

    let trailer_start = pkt.len() - 4;
    let trailer = Trailer::read(&pkt[trailer_start..])?;
    if trailer.encrypted != services.confidentiality {
        return Err(Error::CantCheck);
    }
    replay_check.check(trailer.index)?;

    let iv = kdf::build_rtcp_ctr_iv(ssrc, trailer.index, salt);
    let c = as_non_aead(&mut cipher)?;
    c.set_iv(&iv, CipherDirection::Decrypt)?;

    let auth_len = pkt.len() - tag_len;
    let mac_started = emit_mac_prefix(c, &mut **mac)?;
    if !mac_started {
        mac.start();
    }
    mac.update(&pkt[..auth_len]);
    let computed = mac.compute(&[]);
    let wire_tag = &pkt[auth_len..auth_len + tag_len];
    if crate::cipher::octet_string_is_eq(&computed, wire_tag) != 0 {
        return Err(Error::AuthFail);
    }

    if trailer.encrypted {
        let c = as_non_aead(&mut cipher)?;
        c.decrypt(&mut pkt[OCTETS_IN_RTCP_HEADER..trailer_start - tag_len])?;
    }

    Ok((trailer, auth_len - tag_len))
}

/// AEAD counterpart of [`verify_and_decrypt_rtcp`].
fn decrypt_and_verify_rtcp_gcm(
    rtcp: &Arc<SharedCrypto>,
    salt: &[u8],
    services: Services,
    replay_check: &RtcpReplayDb,
    ssrc: u32,
    pkt: &mut [u8],
) -> Result<(Trailer, usize)> {
    if pkt.len() < OCTETS_IN_RTCP_HEADER + 16 + 4 {
        return Err(Error::BadParam("RTCP/GCM packet shorter than tag + trailer"));
    }
    let trailer_start = pkt.len() - 4;
    let trailer = Trailer::read(&pkt[trailer_start..])?;
    if trailer.encrypted != services.confidentiality {
        return Err(Error::CantCheck);
    }
    replay_check.check(trailer.index)?;

    let tag_start = trailer_start - 16;
    let mut tag = [0u8; 16];
    tag.copy_from_slice(&pkt[tag_start..trailer_start]);

    let mut trailer_bytes = [0u8; 4];
    trailer.write(&mut trailer_bytes)?;

    let aad = if trailer.encrypted {
        pkt[..OCTETS_IN_RTCP_HEADER].to_vec()
    } else {
        pkt[..tag_start].to_vec()
    };
    let mut aad_with_trailer = aad;
    aad_with_trailer.extend_from_slice(&trailer_bytes);

    let nonce = kdf::build_rtcp_gcm_nonce(ssrc, trailer.index, salt);
    let mut cipher = rtcp.cipher.lock().unwrap();
    let gcm = as_gcm(&mut cipher)?;
    gcm.set_iv(&nonce, CipherDirection::Decrypt)?;
    gcm.set_aad(&aad_with_trailer)?;

    if trailer.encrypted {
        gcm.decrypt_and_verify(&mut pkt[OCTETS_IN_RTCP_HEADER..tag_start], &tag)?;
    } else {
        gcm.decrypt_and_verify(&mut [], &tag)?;
    }
    drop(cipher);

    Ok((trailer, tag_start))
}

/// If `mac`'s prefix length is nonzero, draw that many keystream bytes
/// from `cipher` and feed them to the MAC as the first input. Returns
/// whether the MAC has already been `start()`-ed as a
/// side effect, so callers don't double-start it. Neither `HmacSha1` nor
/// `NullAuth` has a nonzero prefix length (see `Mac::prefix_length`), so
/// this is exercised only by future MAC implementations.
fn emit_mac_prefix(cipher: &mut dyn Cipher, mac: &mut dyn crate::cipher::Mac) -> Result<bool> {
    let prefix_len = mac.prefix_length();
    if prefix_len == 0 {
        return Ok(false);
    }
    let mut prefix = vec![0u8; prefix_len];
    cipher.output(&mut prefix)?;
    mac.start();
    mac.update(&prefix);
    Ok(true)
}

#[cfg(test)]
mod session_test;
