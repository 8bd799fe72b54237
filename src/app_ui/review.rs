use arrayvec::ArrayString;
use core::fmt::Write;
use log::debug;

use crate::app_ui::format::{
    print_address, print_bigint_fixed_point, print_i64, print_param, print_u64, print_u64_paged,
};
use crate::parser::check_method;
use crate::tx_types::Transaction;
use crate::utils::{write_single_page, write_str};
use crate::ParserError;

/// Items shown for every message, before the method parameters.
pub const FIXED_ITEMS: u8 = 8;

pub fn num_items(tx: &Transaction) -> u8 {
    FIXED_ITEMS.saturating_add(tx.num_params)
}

/// Renders page `page_idx` of item `display_idx` and returns its page count.
///
/// `out_key` receives the label and `out_val` the value page, both NUL
/// terminated. Items 0-7 are the message fields in fixed order, the rest are
/// the method parameters.
pub fn get_item(
    tx: &Transaction,
    display_idx: u8,
    out_key: &mut [u8],
    out_val: &mut [u8],
    page_idx: u8,
) -> Result<u8, ParserError> {
    debug!("getItem {}", display_idx);

    write_str(out_key, b"?");
    write_str(out_val, b" ");

    if display_idx >= num_items(tx) {
        return Err(ParserError::NoData);
    }

    match display_idx {
        0 => {
            write_str(out_key, b"To ");
            print_address(&tx.to, out_val, page_idx)
        }
        1 => {
            write_str(out_key, b"From ");
            print_address(&tx.from, out_val, page_idx)
        }
        2 => {
            write_str(out_key, b"Nonce ");
            print_u64(tx.nonce, out_val, page_idx)
        }
        3 => {
            write_str(out_key, b"Value ");
            print_bigint_fixed_point(&tx.value, out_val, page_idx)
        }
        4 => {
            write_str(out_key, b"Gas Limit ");
            print_i64(tx.gas_limit, out_val, page_idx)
        }
        5 => {
            write_str(out_key, b"Gas Premium ");
            print_bigint_fixed_point(&tx.gas_premium, out_val, page_idx)
        }
        6 => {
            write_str(out_key, b"Gas Fee Cap ");
            print_bigint_fixed_point(&tx.gas_fee_cap, out_val, page_idx)
        }
        7 => {
            write_str(out_key, b"Method ");
            check_method(tx.method)?;
            if tx.method == 0 {
                write_single_page(out_val, b"Transfer ", page_idx)
            } else {
                print_u64_paged(tx.method, out_val, page_idx)
            }
        }
        _ => {
            let param_idx = display_idx - FIXED_ITEMS;
            if param_idx >= tx.num_params {
                return Err(ParserError::UnexpectedField);
            }

            let mut key: ArrayString<16> = ArrayString::new();
            write!(key, "Params |{}| ", param_idx as u16 + 1)
                .map_err(|_| ParserError::UnexpectedError)?;
            write_str(out_key, key.as_bytes());

            print_param(tx, param_idx, out_val, page_idx)
        }
    }
}
