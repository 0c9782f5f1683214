//! AES-128 known-answer vectors from FIPS-197

use hex_literal::hex;

use crate::block::{Ciphertext, Key, Plaintext};

/// Published (key, plaintext, ciphertext) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownAnswer {
    pub name: &'static str,
    pub key: Key,
    pub plaintext: Plaintext,
    pub ciphertext: Ciphertext,
}

/// FIPS-197 Appendix A.1 key expansion / Appendix B cipher example
pub const FIPS197_APPENDIX_B: KnownAnswer = KnownAnswer {
    name: "fips197-b",
    key: Key::new(hex!("2B7E151628AED2A6ABF7158809CF4F3C")),
    plaintext: Plaintext::new(hex!("3243F6A8885A308D313198A2E0370734")),
    ciphertext: Ciphertext::new(hex!("3925841D02DC09FBDC118597196A0B32")),
};

/// FIPS-197 Appendix C.1, AES-128
pub const FIPS197_APPENDIX_C1: KnownAnswer = KnownAnswer {
    name: "fips197-c1",
    key: Key::new(hex!("000102030405060708090A0B0C0D0E0F")),
    plaintext: Plaintext::new(hex!("00112233445566778899AABBCCDDEEFF")),
    ciphertext: Ciphertext::new(hex!("69C4E0D86A7B0430D8CDB78070B4C55A")),
};

pub const ALL: [KnownAnswer; 2] = [FIPS197_APPENDIX_B, FIPS197_APPENDIX_C1];

/// Look up a vector by its `name`, case-insensitively
pub fn by_name(name: &str) -> Option<KnownAnswer> {
    ALL.into_iter().find(|kat| kat.name.eq_ignore_ascii_case(name))
}
