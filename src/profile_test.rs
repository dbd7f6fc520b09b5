use super::*;

#[test]
fn null_sha1_32_is_rejected() {
    assert!(Profile::from_name("null_sha1_32").is_err());
}

#[test]
fn unknown_name_is_rejected() {
    assert!(Profile::from_name("bogus").is_err());
}

#[test]
fn rtcp_32_bit_tag_upgraded_to_80() {
    let p = Profile::Aes128CmSha1_32;
    assert_eq!(p.rtp_crypto_policy().auth_tag_len, 4);
    assert_eq!(p.rtcp_crypto_policy().auth_tag_len, 10);
}

#[test]
fn all_named_profiles_round_trip() {
    for name in [
        "aes128_cm_sha1_80",
        "aes128_cm_sha1_32",
        "null_sha1_80",
        "aes256_cm_sha1_80",
        "aes256_cm_sha1_32",
    ] {
        Profile::from_name(name).unwrap();
    }
}
