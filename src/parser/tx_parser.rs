use crate::cbor::{CborType, CborValue};
use crate::coin::{COIN_SUPPORTED_TX_VERSION, MAX_SUPPORT_METHOD};
use crate::tx_types::{Address, BigInt, Transaction, MAX_PARAMS_BUFFER_SIZE};
use crate::ParserError;

/// Top-level array sizes accepted before the fields are walked.
const TX_ARRAY_SIZES: [u64; 2] = [9, 10];

impl Transaction {
    /// Decodes and validates a CBOR encoded message.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParserError> {
        read_transaction(data)
    }
}

pub fn check_method(method: u64) -> Result<(), ParserError> {
    if method <= MAX_SUPPORT_METHOD {
        return Ok(());
    }
    Err(ParserError::UnexpectedMethod)
}

/// Asserts the cursor still stands on an item, then moves past it.
fn next_field(value: &mut CborValue) -> Result<(), ParserError> {
    if !value.is_valid() {
        return Err(ParserError::UnexpectedType);
    }
    value.advance()?;
    Ok(())
}

fn read_address(value: &CborValue) -> Result<Address, ParserError> {
    if value.get_type() != CborType::ByteString {
        return Err(ParserError::UnexpectedType);
    }
    Address::try_from(value.byte_string()?)
}

fn read_bigint(value: &CborValue) -> Result<BigInt, ParserError> {
    if value.get_type() != CborType::ByteString {
        return Err(ParserError::UnexpectedType);
    }
    BigInt::try_from(value.byte_string()?)
}

/// Number of direct children of the params container.
fn count_params(params: &[u8]) -> Result<u8, ParserError> {
    let container = CborValue::new(params)?;
    let count = match container.get_type() {
        CborType::Array => container.array_length()?,
        CborType::Map => container.map_length()?,
        _ => return Err(ParserError::UnexpectedType),
    };
    if count >= u8::MAX as u64 {
        return Err(ParserError::ValueOutOfRange);
    }

    // The container must be well formed and span the whole blob
    if container.item_end()? != params.len() {
        return Err(ParserError::UnexpectedTrailingData);
    }

    Ok(count as u8)
}

/// Reads the method number, advances to the params slot and stores the
/// raw params. Individual params are left encoded.
fn read_method(tx: &mut Transaction, value: &mut CborValue) -> Result<(), ParserError> {
    if !value.is_unsigned_integer() {
        return Err(ParserError::UnexpectedType);
    }
    let method = value.get_uint64()?;

    tx.num_params = 0;
    tx.params.clear();

    check_method(method)?;

    next_field(value)?;
    if value.get_type() != CborType::ByteString {
        return Err(ParserError::UnexpectedType);
    }
    let params_len = value.string_length()?;

    if method == 0 {
        // Plain transfers carry no params
        if params_len != 0 {
            return Err(ParserError::UnexpectedNumberItems);
        }
        tx.method = 0;
        return Ok(());
    }

    if params_len > MAX_PARAMS_BUFFER_SIZE {
        return Err(ParserError::UnexpectedNumberItems);
    }

    if params_len != 0 {
        value.copy_byte_string(&mut tx.params)?;
        value.checkpoint()?;
        if tx.params.len() != params_len {
            return Err(ParserError::UnexpectedNumberItems);
        }
        tx.num_params = count_params(&tx.params)?;
    }
    tx.method = method;

    Ok(())
}

/// Walks the message array field by field.
///
/// The whole top-level item is skipped first, which checks it is canonical
/// and that nothing follows it in `data`.
pub fn read_transaction(data: &[u8]) -> Result<Transaction, ParserError> {
    if data.is_empty() {
        return Err(ParserError::InitContextEmpty);
    }

    let mut it = CborValue::new(data)?;
    if !it.is_array() {
        return Err(ParserError::UnexpectedType);
    }
    let array_size = it.array_length()?;
    if !TX_ARRAY_SIZES.contains(&array_size) {
        return Err(ParserError::UnexpectedNumberItems);
    }

    if it.item_end()? != data.len() {
        return Err(ParserError::UnexpectedTrailingData);
    }

    let mut tx = Transaction::default();
    let mut fields = it.enter_container()?;
    fields.checkpoint()?;

    // "version" field
    if !fields.is_integer() {
        return Err(ParserError::UnexpectedType);
    }
    tx.version = fields.get_int64_checked()?;
    next_field(&mut fields)?;
    if tx.version != COIN_SUPPORTED_TX_VERSION {
        return Err(ParserError::UnexpectedTxVersion);
    }

    // "to" field
    tx.to = read_address(&fields)?;
    next_field(&mut fields)?;

    // "from" field
    tx.from = read_address(&fields)?;
    next_field(&mut fields)?;

    // "nonce" field
    if !fields.is_unsigned_integer() {
        return Err(ParserError::UnexpectedType);
    }
    tx.nonce = fields.get_uint64()?;
    next_field(&mut fields)?;

    // "value" field
    tx.value = read_bigint(&fields)?;
    next_field(&mut fields)?;

    // "gasLimit" field
    if !fields.is_integer() {
        return Err(ParserError::UnexpectedType);
    }
    tx.gas_limit = fields.get_int64_checked()?;
    next_field(&mut fields)?;

    // "gasFeeCap" field
    tx.gas_fee_cap = read_bigint(&fields)?;
    next_field(&mut fields)?;

    // "gasPremium" field
    tx.gas_premium = read_bigint(&fields)?;
    next_field(&mut fields)?;

    // "method" and "params" fields
    read_method(&mut tx, &mut fields)?;
    next_field(&mut fields)?;

    it.leave_container(&fields)?;
    it.checkpoint()?;

    if it.offset() != data.len() {
        return Err(ParserError::UnexpectedTrailingData);
    }

    Ok(tx)
}
