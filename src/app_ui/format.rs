use arrayvec::{ArrayString, ArrayVec};
use core::fmt::Write;

use crate::cbor::{CborType, CborValue};
use crate::coin::COIN_AMOUNT_DECIMAL_PLACES;
use crate::crypto::address::format_address;
use crate::tx_types::{Address, BigInt, Transaction, MAX_PARAMS_BUFFER_SIZE};
use crate::utils::{
    bigint_to_decimal, fpstr_to_str, i64_to_str, page_string, to_hex, u64_to_str,
    write_single_page, write_str,
};
use crate::ParserError;

const EMPTY_VALUE: &[u8] = b"-- EMPTY --";

pub fn print_address(address: &Address, out_val: &mut [u8], page_idx: u8) -> Result<u8, ParserError> {
    let text = format_address(address)?;
    page_string(out_val, &text, page_idx)
}

/// Big integer in whole coins, with the coin's fixed number of decimals.
pub fn print_bigint_fixed_point(
    value: &BigInt,
    out_val: &mut [u8],
    page_idx: u8,
) -> Result<u8, ParserError> {
    let mut digits = ArrayVec::new();
    bigint_to_decimal(value.magnitude(), &mut digits)?;

    let mut text = ArrayVec::new();
    fpstr_to_str(&digits, COIN_AMOUNT_DECIMAL_PLACES, &mut text)?;
    page_string(out_val, &text, page_idx)
}

pub fn print_u64(value: u64, out_val: &mut [u8], page_idx: u8) -> Result<u8, ParserError> {
    let mut text = ArrayVec::new();
    u64_to_str(value, &mut text);
    write_single_page(out_val, &text, page_idx)
}

pub fn print_u64_paged(value: u64, out_val: &mut [u8], page_idx: u8) -> Result<u8, ParserError> {
    let mut text = ArrayVec::new();
    u64_to_str(value, &mut text);
    page_string(out_val, &text, page_idx)
}

pub fn print_i64(value: i64, out_val: &mut [u8], page_idx: u8) -> Result<u8, ParserError> {
    let mut text = ArrayVec::new();
    i64_to_str(value, &mut text);
    write_single_page(out_val, &text, page_idx)
}

/// Renders one method parameter.
///
/// The raw params are decoded again on every call: the container is entered,
/// `param_idx` siblings are skipped and only that element is rendered. The
/// walk then runs to the end of the container so a successful call also
/// proves the rest of the params are well formed.
pub fn print_param(
    tx: &Transaction,
    param_idx: u8,
    out_val: &mut [u8],
    page_idx: u8,
) -> Result<u8, ParserError> {
    if param_idx >= tx.num_params {
        return Err(ParserError::ValueOutOfRange);
    }

    let mut container = CborValue::new(&tx.params)?;
    container.checkpoint()?;

    if !container.is_container() {
        return print_value(&container, out_val, page_idx);
    }

    let mut item = container.enter_container()?;
    item.checkpoint()?;
    for _ in 0..param_idx {
        item.advance()?;
        item.checkpoint()?;
    }

    let page_count = print_value(&item, out_val, page_idx)?;

    while !item.at_end() {
        item.advance()?;
    }
    container.leave_container(&item)?;
    container.checkpoint()?;

    Ok(page_count)
}

fn print_value(value: &CborValue, out_val: &mut [u8], page_idx: u8) -> Result<u8, ParserError> {
    match value.get_type() {
        CborType::ByteString => {
            let mut bytes: ArrayVec<u8, MAX_PARAMS_BUFFER_SIZE> = ArrayVec::new();
            value.copy_byte_string(&mut bytes)?;
            value.checkpoint()?;

            if bytes.is_empty() {
                write_str(out_val, EMPTY_VALUE);
                return single_page(page_idx);
            }

            let mut hex_buf = [0u8; MAX_PARAMS_BUFFER_SIZE * 2];
            let hex = hex_buf
                .get_mut(..bytes.len() * 2)
                .ok_or(ParserError::UnexpectedValue)?;
            let count = to_hex(&bytes, hex)?;
            if count != bytes.len() * 2 {
                return Err(ParserError::UnexpectedValue);
            }
            page_string(out_val, hex, page_idx)
        }
        CborType::TextString => {
            let mut text: ArrayVec<u8, MAX_PARAMS_BUFFER_SIZE> = ArrayVec::new();
            value.copy_text_string(&mut text)?;
            value.checkpoint()?;
            page_string(out_val, &text, page_idx)
        }
        CborType::Integer => print_i64(value.get_int64_checked()?, out_val, page_idx),
        other => {
            let mut text: ArrayString<16> = ArrayString::new();
            write!(text, "Type: {}", other as u8).map_err(|_| ParserError::UnexpectedError)?;
            write_str(out_val, text.as_bytes());
            single_page(page_idx)
        }
    }
}

fn single_page(page_idx: u8) -> Result<u8, ParserError> {
    if page_idx != 0 {
        return Err(ParserError::DisplayPageOutOfRange);
    }
    Ok(1)
}
