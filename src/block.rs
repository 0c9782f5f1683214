//! Fixed-size 128-bit blocks exchanged with the accelerator.
//!
//! The accelerator only ever moves whole 16-byte blocks, so each block kind
//! wraps a `[u8; 16]`. Other sizes cannot be constructed; conversions from
//! untyped slices or hex text reject them before any bus activity.

use core::fmt;

use crate::error::Error;

/// Size of every block on the wire, in bytes
pub const BLOCK_SIZE: usize = 16;

/// Number of hex digits in a textual block
const HEX_DIGITS: usize = BLOCK_SIZE * 2;

/// Strip ASCII whitespace from `text` and decode exactly one block of hex.
fn decode_hex_block(text: &str) -> Result<[u8; BLOCK_SIZE], Error> {
    let mut digits = [0u8; HEX_DIGITS];
    let mut count = 0usize;

    for byte in text.bytes().filter(|b| !b.is_ascii_whitespace()) {
        if count < HEX_DIGITS {
            digits[count] = byte;
        }
        count += 1;
    }

    if count % 2 != 0 {
        return Err(hex::FromHexError::OddLength.into());
    }
    if count != HEX_DIGITS {
        return Err(Error::InvalidLength {
            expected: BLOCK_SIZE,
            actual: count / 2,
        });
    }

    let mut out = [0u8; BLOCK_SIZE];
    hex::decode_to_slice(digits, &mut out)?;
    Ok(out)
}

/// Write `bytes` in the console dump format: `2b 7e 15 ...`
fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8; BLOCK_SIZE]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i != 0 {
            f.write_str(" ")?;
        }
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

macro_rules! block_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name([u8; BLOCK_SIZE]);

        impl $name {
            pub const fn new(bytes: [u8; BLOCK_SIZE]) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
                &self.0
            }

            pub const fn into_bytes(self) -> [u8; BLOCK_SIZE] {
                self.0
            }

            /// Parse 32 hex digits. ASCII whitespace between digits is ignored.
            pub fn from_hex(text: &str) -> Result<Self, Error> {
                decode_hex_block(text).map(Self)
            }
        }

        impl From<[u8; BLOCK_SIZE]> for $name {
            fn from(bytes: [u8; BLOCK_SIZE]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = Error;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                let block: [u8; BLOCK_SIZE] = bytes.try_into().map_err(|_| Error::InvalidLength {
                    expected: BLOCK_SIZE,
                    actual: bytes.len(),
                })?;
                Ok(Self(block))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_hex(f, &self.0)
            }
        }
    };
}

block_type!(
    /// 128-bit key, loaded after the plaintext
    Key
);

block_type!(
    /// Input block, loaded first while LOAD is asserted
    Plaintext
);

block_type!(
    /// Output block shifted out of the accelerator after DONE
    Ciphertext
);

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Plaintext(")?;
        write_hex(f, &self.0)?;
        f.write_str(")")
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ciphertext(")?;
        write_hex(f, &self.0)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_from_hex_plain_and_spaced() {
        let plain = Key::from_hex("2B7E151628AED2A6ABF7158809CF4F3C").unwrap();
        let spaced = Key::from_hex("2b 7e 15 16 28 ae d2 a6\n ab f7 15 88 09 cf 4f 3c").unwrap();
        assert_eq!(plain, spaced);
        assert_eq!(plain.as_bytes(), &hex!("2B7E151628AED2A6ABF7158809CF4F3C"));
    }

    #[test]
    fn test_from_hex_wrong_length() {
        match Plaintext::from_hex("3243F6A8885A308D313198A2E03707") {
            Err(Error::InvalidLength { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        match Plaintext::from_hex("3243F6A8885A308D313198A2E0370734AA") {
            Err(Error::InvalidLength { actual, .. }) => assert_eq!(actual, 17),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_hex_bad_digits() {
        assert!(matches!(
            Ciphertext::from_hex("3925841D02DC09FBDC118597196A0B3"),
            Err(Error::InvalidHex(hex::FromHexError::OddLength))
        ));
        assert!(matches!(
            Ciphertext::from_hex("3925841D02DC09FBDC118597196A0BZZ"),
            Err(Error::InvalidHex(hex::FromHexError::InvalidHexCharacter { .. }))
        ));
    }

    #[test]
    fn test_try_from_slice() {
        let bytes = [0xAAu8; 20];
        assert!(Key::try_from(&bytes[..16]).is_ok());
        assert!(matches!(
            Key::try_from(&bytes[..]),
            Err(Error::InvalidLength { expected: 16, actual: 20 })
        ));
        assert!(matches!(
            Key::try_from(&bytes[..0]),
            Err(Error::InvalidLength { expected: 16, actual: 0 })
        ));
    }

    #[test]
    fn test_display_format() {
        let ct = Ciphertext::new(hex!("3925841D02DC09FBDC118597196A0B32"));
        assert_eq!(
            ct.to_string(),
            "39 25 84 1d 02 dc 09 fb dc 11 85 97 19 6a 0b 32"
        );
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = Key::new([0x2B; 16]);
        assert_eq!(format!("{key:?}"), "Key([REDACTED])");
        let pt = Plaintext::new([0x01; 16]);
        assert!(format!("{pt:?}").starts_with("Plaintext(01 01"));
    }

    #[test]
    fn test_ciphertext_compares_embedded_zero_bytes() {
        let a = Ciphertext::new(hex!("00000000000000000000000000000001"));
        let b = Ciphertext::new(hex!("00000000000000000000000000000002"));
        assert_ne!(a, b);
    }
}
