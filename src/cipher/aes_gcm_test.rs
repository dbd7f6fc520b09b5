use super::*;

#[test]
fn encrypt_then_decrypt_round_trips() {
    let key = vec![0x7eu8; 16];
    let iv = [0x01u8; GCM_NONCE_LEN];
    let aad = b"srtp header".to_vec();

    let mut enc = AesGcmCipher::new(CipherId::Aes128Gcm, key.clone()).unwrap();
    enc.set_iv(&iv, Direction::Encrypt).unwrap();
    enc.set_aad(&aad).unwrap();
    let mut buf = b"sensitive payload bytes".to_vec();
    let plaintext = buf.clone();
    enc.encrypt(&mut buf).unwrap();
    let mut tag = [0u8; GCM_TAG_LEN];
    enc.get_tag(&mut tag).unwrap();
    assert_ne!(buf, plaintext);

    let mut dec = AesGcmCipher::new(CipherId::Aes128Gcm, key).unwrap();
    dec.set_iv(&iv, Direction::Decrypt).unwrap();
    dec.set_aad(&aad).unwrap();
    dec.decrypt_and_verify(&mut buf, &tag).unwrap();
    assert_eq!(buf, plaintext);
}

#[test]
fn tampered_tag_fails_verification() {
    let key = vec![0x11u8; 32];
    let iv = [0x02u8; GCM_NONCE_LEN];

    let mut enc = AesGcmCipher::new(CipherId::Aes256Gcm, key.clone()).unwrap();
    enc.set_iv(&iv, Direction::Encrypt).unwrap();
    let mut buf = b"another payload!".to_vec();
    enc.encrypt(&mut buf).unwrap();
    let mut tag = [0u8; GCM_TAG_LEN];
    enc.get_tag(&mut tag).unwrap();
    tag[0] ^= 0xff;

    let mut dec = AesGcmCipher::new(CipherId::Aes256Gcm, key).unwrap();
    dec.set_iv(&iv, Direction::Decrypt).unwrap();
    assert!(dec.decrypt_and_verify(&mut buf, &tag).is_err());
}

#[test]
fn rejects_wrong_key_length() {
    assert!(AesGcmCipher::new(CipherId::Aes128Gcm, vec![0u8; 32]).is_err());
}
