use super::*;

#[test]
fn trailer_round_trips() {
    let t = Trailer::new(true, 0x1234_5678);
    let mut buf = [0u8; 4];
    t.write(&mut buf).unwrap();
    assert_eq!(Trailer::read(&buf).unwrap(), t);
}

#[test]
fn trailer_masks_index_to_31_bits() {
    let t = Trailer::new(false, 0xffff_ffff);
    assert_eq!(t.index, INDEX_MASK);
    assert_eq!(t.to_word() & E_BIT, 0);
}

#[test]
fn reads_ssrc_from_header() {
    let mut buf = vec![0u8; OCTETS_IN_RTCP_HEADER];
    BigEndian::write_u32(&mut buf[4..8], 0xaabbccdd);
    assert_eq!(ssrc(&buf).unwrap(), 0xaabbccdd);
}
