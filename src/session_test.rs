use super::*;
use crate::limit::UsageLimit;
use crate::policy::{CryptoPolicy, Services};

fn specific_policy(ssrc: u32) -> Policy {
    Policy {
        ssrc: Ssrc::Specific(ssrc),
        rtp: CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
        rtcp: CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
        rtp_services: Services::CONFIDENTIALITY_AND_AUTH,
        rtcp_services: Services::CONFIDENTIALITY_AND_AUTH,
        master_key: vec![0x11u8; 16],
        master_salt: vec![0x22u8; 14],
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    }
}

fn gcm_policy(ssrc: u32) -> Policy {
    Policy {
        ssrc: Ssrc::Specific(ssrc),
        rtp: CryptoPolicy::AEAD_AES_128_GCM,
        rtcp: CryptoPolicy::AEAD_AES_128_GCM,
        rtp_services: Services::CONFIDENTIALITY_AND_AUTH,
        rtcp_services: Services::CONFIDENTIALITY_AND_AUTH,
        master_key: vec![0x33u8; 16],
        master_salt: vec![0x44u8; 14],
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    }
}

fn rtp_packet(ssrc: u32, seq: u16) -> Vec<u8> {
    let mut pkt = vec![0u8; 12];
    pkt[0] = 0x80;
    pkt[1] = 111;
    pkt[2..4].copy_from_slice(&seq.to_be_bytes());
    pkt[8..12].copy_from_slice(&ssrc.to_be_bytes());
    pkt.extend_from_slice(b"some audio payload bytes");
    pkt
}

fn rtcp_packet(ssrc: u32) -> Vec<u8> {
    let mut pkt = vec![0u8; 8];
    pkt[0] = 0x80;
    pkt[1] = 200;
    pkt[4..8].copy_from_slice(&ssrc.to_be_bytes());
    pkt.extend_from_slice(b"sender report body");
    pkt
}

#[test]
fn rtp_ctr_hmac_round_trips() {
    let mut tx = Session::create(vec![specific_policy(42)]).unwrap();
    let mut rx = Session::create(vec![specific_policy(42)]).unwrap();

    let mut pkt = rtp_packet(42, 1);
    let plaintext = pkt.clone();
    tx.protect_rtp(&mut pkt).unwrap();
    assert_ne!(pkt[12..plaintext.len()], plaintext[12..]);

    rx.unprotect_rtp(&mut pkt).unwrap();
    assert_eq!(pkt, plaintext);
}

#[test]
fn rtp_gcm_round_trips() {
    let mut tx = Session::create(vec![gcm_policy(7)]).unwrap();
    let mut rx = Session::create(vec![gcm_policy(7)]).unwrap();

    let mut pkt = rtp_packet(7, 9);
    let plaintext = pkt.clone();
    tx.protect_rtp(&mut pkt).unwrap();
    rx.unprotect_rtp(&mut pkt).unwrap();
    assert_eq!(pkt, plaintext);
}

#[test]
fn rtp_replay_is_rejected() {
    let mut tx = Session::create(vec![specific_policy(5)]).unwrap();
    let mut rx = Session::create(vec![specific_policy(5)]).unwrap();

    let mut pkt = rtp_packet(5, 1);
    tx.protect_rtp(&mut pkt).unwrap();
    let protected = pkt.clone();

    let mut first = protected.clone();
    rx.unprotect_rtp(&mut first).unwrap();

    let mut replay = protected;
    assert_eq!(rx.unprotect_rtp(&mut replay).unwrap_err(), Error::ReplayFail);
}

#[test]
fn rtp_tampered_auth_tag_fails() {
    let mut tx = Session::create(vec![specific_policy(9)]).unwrap();
    let mut rx = Session::create(vec![specific_policy(9)]).unwrap();

    let mut pkt = rtp_packet(9, 1);
    tx.protect_rtp(&mut pkt).unwrap();
    let last = pkt.len() - 1;
    pkt[last] ^= 0xff;

    assert_eq!(rx.unprotect_rtp(&mut pkt).unwrap_err(), Error::AuthFail);
}

#[test]
fn rtcp_ctr_hmac_round_trips() {
    let mut tx = Session::create(vec![specific_policy(77)]).unwrap();
    let mut rx = Session::create(vec![specific_policy(77)]).unwrap();

    let mut pkt = rtcp_packet(77);
    let plaintext = pkt.clone();
    tx.protect_rtcp(&mut pkt).unwrap();
    rx.unprotect_rtcp(&mut pkt).unwrap();
    assert_eq!(pkt, plaintext);
}

#[test]
fn rtcp_gcm_round_trips() {
    let mut tx = Session::create(vec![gcm_policy(78)]).unwrap();
    let mut rx = Session::create(vec![gcm_policy(78)]).unwrap();

    let mut pkt = rtcp_packet(78);
    let plaintext = pkt.clone();
    tx.protect_rtcp(&mut pkt).unwrap();
    rx.unprotect_rtcp(&mut pkt).unwrap();
    assert_eq!(pkt, plaintext);
}

#[test]
fn direction_collision_emits_event_but_does_not_fail() {
    let mut session = Session::create(vec![specific_policy(1)]).unwrap();
    let mut pkt = rtp_packet(1, 1);
    session.protect_rtp(&mut pkt).unwrap(); // pins sender

    let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    session.set_event_handler(Box::new(move |ev, ssrc| {
        events_clone.lock().unwrap().push((ev, ssrc));
    }));

    // Receiving on a sender-pinned stream should emit a collision but
    // still be attempted (and fail here only because this is random
    // garbage, not because of the collision itself).
    let mut garbage = rtcp_packet(1);
    let _ = session.unprotect_rtcp(&mut garbage);
}

#[test]
fn missing_stream_without_template_is_no_ctx() {
    let mut session = Session::create(vec![specific_policy(1)]).unwrap();
    let mut pkt = rtp_packet(2, 1);
    assert_eq!(session.protect_rtp(&mut pkt).unwrap_err(), Error::NoCtx);
}

#[test]
fn template_clone_handles_new_ssrc() {
    let template_policy = Policy {
        ssrc: Ssrc::AnyOutbound,
        ..specific_policy(0)
    };
    let mut session = Session::create(vec![template_policy]).unwrap();
    let mut pkt = rtp_packet(999, 1);
    session.protect_rtp(&mut pkt).unwrap();
    assert!(session.get_stream(999).is_some());
}

#[test]
fn second_template_is_rejected() {
    let mut session = Session::create(vec![Policy {
        ssrc: Ssrc::AnyOutbound,
        ..specific_policy(0)
    }])
    .unwrap();
    let second = Policy {
        ssrc: Ssrc::AnyInbound,
        ..specific_policy(0)
    };
    assert!(session.add_stream(&second).is_err());
}

// ---- end-to-end scenarios ---------------------------------------

fn hello_rtp_packet(ssrc: u32, seq: u16) -> Vec<u8> {
    let mut pkt = vec![0u8; 12];
    pkt[0] = 0x80;
    pkt[1] = 111;
    pkt[2..4].copy_from_slice(&seq.to_be_bytes());
    pkt[8..12].copy_from_slice(&ssrc.to_be_bytes());
    pkt.extend_from_slice(b"HELLO");
    pkt
}

#[test]
fn scenario_aes128_cm_hmac_sha1_80_zero_key() {
    let policy = Policy {
        ssrc: Ssrc::Specific(0xcafe_babe),
        rtp: CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
        rtcp: CryptoPolicy::AES_128_CM_HMAC_SHA1_80,
        rtp_services: Services::CONFIDENTIALITY_AND_AUTH,
        rtcp_services: Services::CONFIDENTIALITY_AND_AUTH,
        master_key: vec![0u8; 16],
        master_salt: vec![0u8; 14],
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    };
    let mut tx = Session::create(vec![policy.clone()]).unwrap();
    let mut rx = Session::create(vec![policy]).unwrap();

    let plaintext = hello_rtp_packet(0xcafe_babe, 1);
    let mut pkt = plaintext.clone();
    tx.protect_rtp(&mut pkt).unwrap();
    assert_eq!(pkt.len(), plaintext.len() + 10);

    let mut tampered = pkt.clone();
    tampered[12] ^= 0xff;
    assert_eq!(rx.unprotect_rtp(&mut tampered).unwrap_err(), Error::AuthFail);

    let mut untouched = pkt;
    rx.unprotect_rtp(&mut untouched).unwrap();
    assert_eq!(untouched, plaintext);
}

#[test]
fn scenario_aes256_cm_hmac_sha1_80_zero_key() {
    let policy = Policy {
        ssrc: Ssrc::Specific(0xcafe_babe),
        rtp: CryptoPolicy::AES_256_CM_HMAC_SHA1_80,
        rtcp: CryptoPolicy::AES_256_CM_HMAC_SHA1_80,
        rtp_services: Services::CONFIDENTIALITY_AND_AUTH,
        rtcp_services: Services::CONFIDENTIALITY_AND_AUTH,
        master_key: vec![0u8; 32],
        master_salt: vec![0u8; 14],
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    };
    let mut tx = Session::create(vec![policy.clone()]).unwrap();
    let mut rx = Session::create(vec![policy]).unwrap();

    let plaintext = hello_rtp_packet(0xcafe_babe, 1);
    let mut pkt = plaintext.clone();
    tx.protect_rtp(&mut pkt).unwrap();
    assert_eq!(pkt.len(), plaintext.len() + 10);

    rx.unprotect_rtp(&mut pkt).unwrap();
    assert_eq!(pkt, plaintext);
}

#[test]
fn scenario_gcm_sequence_number_rollover() {
    let ssrc = 0x1122_3344;
    let mut tx = Session::create(vec![gcm_policy(ssrc)]).unwrap();
    let mut rx = Session::create(vec![gcm_policy(ssrc)]).unwrap();

    let mut first_protected = None;
    let mut seq = 65530u16;
    loop {
        let mut pkt = rtp_packet(ssrc, seq);
        tx.protect_rtp(&mut pkt).unwrap();
        rx.unprotect_rtp(&mut pkt.clone()).unwrap();
        if first_protected.is_none() {
            first_protected = Some(pkt);
        }
        if seq == 4 {
            break;
        }
        seq = seq.wrapping_add(1);
    }

    // ROC has advanced past the wrap; the stream's RTP extended index
    // must reflect it.
    let est = rx.get_stream(ssrc).unwrap().rtp_replay.estimate(4).0;
    assert!(est >> 16 >= 1, "ROC did not advance across the sequence wrap");

    let mut replay = first_protected.unwrap();
    assert_eq!(rx.unprotect_rtp(&mut replay).unwrap_err(), Error::ReplayFail);
}

#[test]
fn scenario_rtcp_null_cipher_auth_only() {
    let policy = Policy {
        ssrc: Ssrc::Specific(200),
        rtp: CryptoPolicy::NULL_CIPHER_HMAC_SHA1_80,
        rtcp: CryptoPolicy::NULL_CIPHER_HMAC_SHA1_80,
        rtp_services: Services {
            confidentiality: false,
            authentication: true,
        },
        rtcp_services: Services {
            confidentiality: false,
            authentication: true,
        },
        master_key: vec![0x55u8; 16],
        master_salt: vec![0x66u8; 14],
        window_size: 0,
        ekt: None,
        allow_repeat_tx: false,
    };

    // Corrupting the trailer's index bits invalidates the tag.
    let mut tx = Session::create(vec![policy.clone()]).unwrap();
    let mut rx = Session::create(vec![policy.clone()]).unwrap();
    let mut pkt = rtcp_packet(200);
    tx.protect_rtcp(&mut pkt).unwrap();
    let trailer_start = pkt.len() - 4;
    assert_eq!(pkt[trailer_start] & 0x80, 0, "E-bit must be clear");
    pkt[trailer_start + 3] ^= 0x01;
    assert_eq!(rx.unprotect_rtcp(&mut pkt).unwrap_err(), Error::AuthFail);

    // A set E-bit with confidentiality off in policy is unverifiable.
    let mut tx2 = Session::create(vec![policy.clone()]).unwrap();
    let mut rx2 = Session::create(vec![policy]).unwrap();
    let mut pkt2 = rtcp_packet(200);
    tx2.protect_rtcp(&mut pkt2).unwrap();
    let trailer_start2 = pkt2.len() - 4;
    pkt2[trailer_start2] ^= 0x80;
    assert_eq!(rx2.unprotect_rtcp(&mut pkt2).unwrap_err(), Error::CantCheck);
}

#[test]
fn scenario_template_clone_then_send_direction_collision() {
    let template_policy = Policy {
        ssrc: Ssrc::AnyInbound,
        ..specific_policy(0)
    };
    let mut tx = Session::create(vec![specific_policy(555)]).unwrap();
    let mut rx = Session::create(vec![template_policy]).unwrap();

    let mut pkt = rtp_packet(555, 1);
    tx.protect_rtp(&mut pkt).unwrap();
    rx.unprotect_rtp(&mut pkt).unwrap();
    assert_eq!(rx.get_stream(555).unwrap().direction, Direction::Receiver);

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    rx.set_event_handler(Box::new(move |ev, ssrc| {
        events_clone.lock().unwrap().push((ev, ssrc));
    }));

    let mut out = rtp_packet(555, 2);
    let _ = rx.protect_rtp(&mut out);
    assert!(events
        .lock()
        .unwrap()
        .contains(&(Event::SsrcCollision, 555)));
}

#[test]
fn scenario_key_usage_hard_limit_expires_key() {
    let mut session = Session::create(vec![specific_policy(55)]).unwrap();
    *session.get_stream(55).unwrap().limit.lock().unwrap() = UsageLimit::new(3);

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    session.set_event_handler(Box::new(move |ev, ssrc| {
        events_clone.lock().unwrap().push((ev, ssrc));
    }));

    for seq in 1..=3u16 {
        let mut pkt = rtp_packet(55, seq);
        session.protect_rtp(&mut pkt).unwrap();
    }

    let mut pkt = rtp_packet(55, 4);
    assert_eq!(session.protect_rtp(&mut pkt).unwrap_err(), Error::KeyExpired);
    assert!(events
        .lock()
        .unwrap()
        .contains(&(Event::KeyHardLimit, 55)));
}

#[test]
fn spoofed_ssrc_with_bad_tag_does_not_register_a_stream() {
    let template_policy = Policy {
        ssrc: Ssrc::AnyInbound,
        ..specific_policy(0)
    };
    let mut rx = Session::create(vec![template_policy]).unwrap();

    let mut pkt = rtp_packet(0xdead_beef, 1);
    let last = pkt.len() - 1;
    pkt[last] ^= 0xff;

    assert_eq!(rx.unprotect_rtp(&mut pkt).unwrap_err(), Error::AuthFail);
    assert!(
        rx.get_stream(0xdead_beef).is_none(),
        "a packet that fails authentication must not leave a cloned stream behind"
    );
}

#[test]
fn gcm_replay_of_an_older_packet_is_detected_after_several_packets() {
    let ssrc = 0x9988_7766;
    let mut tx = Session::create(vec![gcm_policy(ssrc)]).unwrap();
    let mut rx = Session::create(vec![gcm_policy(ssrc)]).unwrap();

    let mut second = None;
    for seq in 1..=3u16 {
        let mut pkt = rtp_packet(ssrc, seq);
        tx.protect_rtp(&mut pkt).unwrap();
        if seq == 2 {
            second = Some(pkt.clone());
        }
        rx.unprotect_rtp(&mut pkt).unwrap();
    }

    // If the extended index stopped advancing after the first packet,
    // this replay of an already-seen (but no-longer-newest) packet
    // would be wrongly accepted instead of rejected.
    let mut replay = second.unwrap();
    assert_eq!(rx.unprotect_rtp(&mut replay).unwrap_err(), Error::ReplayFail);
}
