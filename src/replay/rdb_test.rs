use super::*;

#[test]
fn sender_increments_and_detects_overflow() {
    let mut db = RtcpReplayDb::new(64).unwrap();
    assert_eq!(db.increment().unwrap(), 0);
    assert_eq!(db.increment().unwrap(), 1);

    let mut near_full = RtcpReplayDb::new(64).unwrap();
    near_full.highest = Some(MAX_SRTCP_INDEX);
    assert_eq!(near_full.increment().unwrap_err(), Error::KeyExpired);
}

#[test]
fn receiver_detects_replay_and_old() {
    let mut db = RtcpReplayDb::new(64).unwrap();
    for i in 0..100u32 {
        db.check(i).unwrap();
        db.add(i);
    }
    assert_eq!(db.check(99).unwrap_err(), Error::ReplayFail);
    assert_eq!(db.check(10).unwrap_err(), Error::ReplayOld);
    db.check(100).unwrap();
}
