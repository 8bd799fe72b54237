use arrayvec::ArrayVec;

use crate::ParserError;

// Address protocols (first byte of the binary address)
pub const ADDRESS_PROTOCOL_ID: u8 = 0;
pub const ADDRESS_PROTOCOL_SECP256K1: u8 = 1;
pub const ADDRESS_PROTOCOL_ACTOR: u8 = 2;
pub const ADDRESS_PROTOCOL_BLS: u8 = 3;

pub const ADDRESS_PROTOCOL_ID_PAYLOAD_MAX_LEN: usize = 20;
pub const ADDRESS_PROTOCOL_SECP256K1_PAYLOAD_LEN: usize = 20;
pub const ADDRESS_PROTOCOL_ACTOR_PAYLOAD_LEN: usize = 20;
pub const ADDRESS_PROTOCOL_BLS_PAYLOAD_LEN: usize = 48;

pub const MAX_ADDRESS_LEN: usize = 90;
pub const MAX_BIGINT_LEN: usize = 129;
pub const MAX_PARAMS_BUFFER_SIZE: usize = 200;

/// Protocol-tagged binary address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    buffer: ArrayVec<u8, MAX_ADDRESS_LEN>,
}

impl Address {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn protocol(&self) -> Option<u8> {
        self.buffer.first().copied()
    }

    pub fn payload(&self) -> &[u8] {
        self.buffer.get(1..).unwrap_or(&[])
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ParserError;

    /// Builds an [`Address`] from its binary form.
    ///
    /// The input must hold a protocol byte plus a payload whose length is the
    /// one fixed for that protocol (ID payloads are a varint of up to 20
    /// bytes). Anything else is [`ParserError::InvalidAddress`].
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let mut buffer = ArrayVec::new();
        buffer
            .try_extend_from_slice(data)
            .map_err(|_| ParserError::InvalidAddress)?;

        // Protocol byte plus at least one byte of payload
        if buffer.len() < 2 {
            return Err(ParserError::InvalidAddress);
        }

        let payload_len = buffer.len() - 1;
        let valid = match buffer[0] {
            ADDRESS_PROTOCOL_ID => payload_len <= ADDRESS_PROTOCOL_ID_PAYLOAD_MAX_LEN,
            ADDRESS_PROTOCOL_SECP256K1 => payload_len == ADDRESS_PROTOCOL_SECP256K1_PAYLOAD_LEN,
            ADDRESS_PROTOCOL_ACTOR => payload_len == ADDRESS_PROTOCOL_ACTOR_PAYLOAD_LEN,
            ADDRESS_PROTOCOL_BLS => payload_len == ADDRESS_PROTOCOL_BLS_PAYLOAD_LEN,
            _ => false,
        };
        if !valid {
            return Err(ParserError::InvalidAddress);
        }

        Ok(Address { buffer })
    }
}

/// Non-negative big integer: a sign byte followed by a big-endian magnitude.
/// An empty buffer is zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BigInt {
    buffer: ArrayVec<u8, MAX_BIGINT_LEN>,
}

impl BigInt {
    pub const SIGN_POSITIVE: u8 = 0x00;

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn magnitude(&self) -> &[u8] {
        self.buffer.get(1..).unwrap_or(&[])
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude().iter().all(|&b| b == 0)
    }
}

impl TryFrom<&[u8]> for BigInt {
    type Error = ParserError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let mut buffer = ArrayVec::new();
        buffer
            .try_extend_from_slice(data)
            .map_err(|_| ParserError::ValueOutOfRange)?;

        if buffer.is_empty() {
            return Ok(BigInt { buffer });
        }
        // A lone sign byte carries no magnitude
        if buffer.len() == 1 {
            return Err(ParserError::UnexpectedValue);
        }
        // Negative values do not exist at this layer
        if buffer[0] != Self::SIGN_POSITIVE {
            return Err(ParserError::UnexpectedValue);
        }

        Ok(BigInt { buffer })
    }
}

/// A fully validated message.
///
/// `params` keeps the raw CBOR of the method arguments; only the item count
/// of its top-level container is known after parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    pub version: i64,
    pub to: Address,
    pub from: Address,
    pub nonce: u64,
    pub value: BigInt,
    pub gas_limit: i64,
    pub gas_fee_cap: BigInt,
    pub gas_premium: BigInt,
    pub method: u64,
    pub params: ArrayVec<u8, MAX_PARAMS_BUFFER_SIZE>,
    pub num_params: u8,
}
