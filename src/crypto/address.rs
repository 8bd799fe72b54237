use arrayvec::ArrayVec;

use crate::coin::COIN_NETWORK_PREFIX;
use crate::tx_types::{
    Address, ADDRESS_PROTOCOL_ACTOR, ADDRESS_PROTOCOL_BLS, ADDRESS_PROTOCOL_BLS_PAYLOAD_LEN,
    ADDRESS_PROTOCOL_ID, ADDRESS_PROTOCOL_SECP256K1,
};
use crate::utils::u64_to_str;
use crate::ParserError;

const CHARSET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
pub const CHECKSUM_LEN: usize = 4;

// network + protocol + base32 of a BLS payload and checksum
pub const MAX_ADDRESS_TEXT_LEN: usize = 2 + 84;

const MAX_CHECKSUMMED_LEN: usize = ADDRESS_PROTOCOL_BLS_PAYLOAD_LEN + CHECKSUM_LEN;

/// Canonical text form of a binary address.
///
/// ID addresses render as the network prefix, `0` and the decimal actor id.
/// The other protocols render as the prefix, the protocol digit and the
/// unpadded lowercase base32 of `payload ‖ blake2b-32(protocol ‖ payload)`.
pub fn format_address(
    address: &Address,
) -> Result<ArrayVec<u8, MAX_ADDRESS_TEXT_LEN>, ParserError> {
    let protocol = address.protocol().ok_or(ParserError::InvalidAddress)?;
    let payload = address.payload();

    let mut out = ArrayVec::new();
    out.push(COIN_NETWORK_PREFIX);

    match protocol {
        ADDRESS_PROTOCOL_ID => {
            out.push(b'0');
            let id = decode_uvarint(payload)?;
            let mut digits = ArrayVec::new();
            u64_to_str(id, &mut digits);
            out.try_extend_from_slice(&digits)
                .map_err(|_| ParserError::InvalidAddress)?;
        }
        ADDRESS_PROTOCOL_SECP256K1 | ADDRESS_PROTOCOL_ACTOR | ADDRESS_PROTOCOL_BLS => {
            out.push(b'0' + protocol);

            let mut data: ArrayVec<u8, MAX_CHECKSUMMED_LEN> = ArrayVec::new();
            data.try_extend_from_slice(payload)
                .map_err(|_| ParserError::InvalidAddress)?;
            data.try_extend_from_slice(&address_checksum(address.as_bytes()))
                .map_err(|_| ParserError::InvalidAddress)?;

            base32_encode(&data, &mut out)?;
        }
        _ => return Err(ParserError::InvalidAddress),
    }

    Ok(out)
}

/// First four bytes of blake2b over `protocol ‖ payload`.
pub fn address_checksum(address_bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake2b_simd::Params::new()
        .hash_length(CHECKSUM_LEN)
        .hash(address_bytes);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(hash.as_bytes());
    checksum
}

/// Unsigned LEB128, which must use every byte of `data` in minimal form.
fn decode_uvarint(data: &[u8]) -> Result<u64, ParserError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, &b) in data.iter().enumerate() {
        if shift >= 64 || (shift == 63 && b > 1) {
            return Err(ParserError::InvalidAddress);
        }
        value |= ((b & 0x7f) as u64) << shift;

        if b & 0x80 == 0 {
            let last = i + 1 == data.len();
            // A trailing zero group means a longer encoding than needed
            let minimal = b != 0 || i == 0;
            if !last || !minimal {
                return Err(ParserError::InvalidAddress);
            }
            return Ok(value);
        }
        shift += 7;
    }

    Err(ParserError::InvalidAddress)
}

/// Unpadded RFC 4648 base32, lowercase.
fn base32_encode<const N: usize>(
    data: &[u8],
    out: &mut ArrayVec<u8, N>,
) -> Result<(), ParserError> {
    let mut acc: u16 = 0;
    let mut bits: u8 = 0;

    for &byte in data {
        acc = (acc << 8) | byte as u16;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.try_push(CHARSET[((acc >> bits) & 0x1f) as usize])
                .map_err(|_| ParserError::InvalidAddress)?;
        }
        acc &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.try_push(CHARSET[((acc << (5 - bits)) & 0x1f) as usize])
            .map_err(|_| ParserError::InvalidAddress)?;
    }
    Ok(())
}

#[cfg(all(test, not(feature = "testnet")))]
mod tests {
    use super::*;

    fn text(raw: &[u8]) -> Result<std::string::String, ParserError> {
        let address = Address::try_from(raw)?;
        let out = format_address(&address)?;
        Ok(std::string::String::from_utf8(out.to_vec()).unwrap())
    }

    #[test]
    fn id_addresses() {
        assert_eq!(text(&[0x00, 0x00]).unwrap(), "f00");
        assert_eq!(text(&[0x00, 0x01]).unwrap(), "f01");
        assert_eq!(text(&[0x00, 0xe8, 0x07]).unwrap(), "f01000");
        assert_eq!(
            text(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]).unwrap(),
            "f018446744073709551615"
        );
    }

    #[test]
    fn id_payload_must_be_a_minimal_varint() {
        // continuation bit on the last byte
        assert_eq!(text(&[0x00, 0x80]), Err(ParserError::InvalidAddress));
        // bytes after the end of the varint
        assert_eq!(text(&[0x00, 0x01, 0x01]), Err(ParserError::InvalidAddress));
        // padded encoding of zero
        assert_eq!(text(&[0x00, 0x80, 0x00]), Err(ParserError::InvalidAddress));
        // more than 64 bits
        assert_eq!(
            text(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]),
            Err(ParserError::InvalidAddress)
        );
    }

    #[test]
    fn secp256k1_address() {
        let raw = [
            0x01, 0xfd, 0x1d, 0x0f, 0x4d, 0xfc, 0xb7, 0xba, 0xd3, 0xcb, 0x7b, 0xe4, 0x3d, 0x2f,
            0x42, 0x1a, 0x20, 0x70, 0x16, 0x79, 0x91,
        ];
        assert_eq!(
            text(&raw).unwrap(),
            "f17uoq6tp4w65nhs334q6s6qq2ebybm6mrqebxzxq"
        );
    }

    #[test]
    fn bls_address_length() {
        let mut raw = [0u8; 49];
        raw[0] = ADDRESS_PROTOCOL_BLS;
        let t = text(&raw).unwrap();
        // 52 bytes of base32 is 84 characters
        assert_eq!(t.len(), 86);
        assert!(t.starts_with("f3"));
    }

    #[test]
    fn base32_alphabet() {
        let mut out: ArrayVec<u8, 16> = ArrayVec::new();
        base32_encode(b"f", &mut out).unwrap();
        assert_eq!(out.as_slice(), b"my");

        out.clear();
        base32_encode(b"foobar", &mut out).unwrap();
        assert_eq!(out.as_slice(), b"mzxw6ytboi");

        let mut small: ArrayVec<u8, 1> = ArrayVec::new();
        assert_eq!(
            base32_encode(&[0xff, 0xff], &mut small),
            Err(ParserError::InvalidAddress)
        );
    }
}
