use super::*;
use crate::policy::Ssrc;

fn test_policy() -> Policy {
    Policy {
        ssrc: Ssrc::Specific(0xcafe_babe),
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

#[test]
fn new_stream_starts_unknown_direction() {
    let s = StreamContext::new(&test_policy()).unwrap();
    assert_eq!(s.direction, Direction::Unknown);
    assert_eq!(s.rtp_salt.len(), 12);
}

#[test]
fn clone_shares_crypto_but_not_replay_state() {
    let template = StreamContext::new(&test_policy()).unwrap();
    let clone_a = template.clone_for_ssrc(1, Direction::Sender);
    let clone_b = template.clone_for_ssrc(2, Direction::Sender);

    assert!(Arc::ptr_eq(&clone_a.rtp, &clone_b.rtp));
    assert!(Arc::ptr_eq(&clone_a.limit, &template.limit));

    clone_a.rtp_replay.check(5).unwrap();
    // clone_b's replay window starts fresh and independent of clone_a's.
    clone_b.rtcp_replay.check(0).unwrap();
}

#[test]
fn rejects_undefined_ssrc() {
    let mut p = test_policy();
    p.ssrc = Ssrc::Undefined;
    assert!(StreamContext::new(&p).is_err());
}
