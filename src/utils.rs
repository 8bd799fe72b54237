use arrayvec::ArrayVec;
use numtoa::NumToA;

use crate::ParserError;

/// Most decimal digits a formatted big integer may have.
pub const MAX_BIGINT_DIGITS: usize = 64;

// 64 magnitude bytes need at most 155 decimal digits
const BIGINT_WORK_DIGITS: usize = 160;
const BIGINT_MAX_MAGNITUDE: usize = 64;

/// Enough for a 64 digit integer part or fraction plus "0." and a NUL.
pub const MAX_FIXED_POINT_LEN: usize = MAX_BIGINT_DIGITS + 2 + 32;

/// Zeroes `out` and writes `value` NUL terminated, truncating if needed.
/// Returns false when `value` was truncated.
pub fn write_str(out: &mut [u8], value: &[u8]) -> bool {
    out.fill(0);
    let Some(room) = out.len().checked_sub(1) else {
        return value.is_empty();
    };
    let n = value.len().min(room);
    out[..n].copy_from_slice(&value[..n]);
    n == value.len()
}

/// Writes a value that must fit a single page.
pub fn write_single_page(out: &mut [u8], value: &[u8], page_idx: u8) -> Result<u8, ParserError> {
    if page_idx != 0 {
        return Err(ParserError::DisplayPageOutOfRange);
    }
    if !write_str(out, value) {
        return Err(ParserError::UnexpectedError);
    }
    Ok(1)
}

/// Copies page `page_idx` of `input` into `out` (NUL terminated) and returns
/// the page count. Each page holds `out.len() - 1` bytes; an empty input is a
/// single empty page.
pub fn page_string(out: &mut [u8], input: &[u8], page_idx: u8) -> Result<u8, ParserError> {
    out.fill(0);
    let chunk = match out.len().checked_sub(1) {
        Some(chunk) if chunk > 0 => chunk,
        _ => return Err(ParserError::UnexpectedBufferEnd),
    };

    let pages = input.len().div_ceil(chunk).max(1);
    let page_count = u8::try_from(pages).map_err(|_| ParserError::ValueOutOfRange)?;
    if page_idx >= page_count {
        return Err(ParserError::DisplayPageOutOfRange);
    }

    let start = page_idx as usize * chunk;
    let end = (start + chunk).min(input.len());
    if start < end {
        out[..end - start].copy_from_slice(&input[start..end]);
    }
    Ok(page_count)
}

pub fn u64_to_str(value: u64, out: &mut ArrayVec<u8, 20>) {
    let mut buf = [0u8; 20];
    let digits = value.numtoa_str(10, &mut buf);
    out.clear();
    // 20 digits always fit
    let _ = out.try_extend_from_slice(digits.as_bytes());
}

pub fn i64_to_str(value: i64, out: &mut ArrayVec<u8, 21>) {
    let mut digits = ArrayVec::<u8, 20>::new();
    u64_to_str(value.unsigned_abs(), &mut digits);
    out.clear();
    if value < 0 {
        out.push(b'-');
    }
    let _ = out.try_extend_from_slice(&digits);
}

/// Decimal digits of a big-endian unsigned magnitude, without leading zeros.
/// Zero is "0". More than [`MAX_BIGINT_DIGITS`] digits is out of range.
pub fn bigint_to_decimal(
    magnitude: &[u8],
    out: &mut ArrayVec<u8, MAX_BIGINT_DIGITS>,
) -> Result<(), ParserError> {
    out.clear();

    let first = magnitude.iter().position(|&b| b != 0).unwrap_or(magnitude.len());
    let magnitude = &magnitude[first..];
    if magnitude.len() > BIGINT_MAX_MAGNITUDE {
        return Err(ParserError::ValueOutOfRange);
    }

    // Little-endian base 10 accumulator
    let mut work = [0u8; BIGINT_WORK_DIGITS];
    let mut used = 0usize;
    for &byte in magnitude {
        let mut carry = byte as u32;
        for digit in work[..used].iter_mut() {
            let v = (*digit as u32) * 256 + carry;
            *digit = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            if used == work.len() {
                return Err(ParserError::ValueOutOfRange);
            }
            work[used] = (carry % 10) as u8;
            carry /= 10;
            used += 1;
        }
    }

    if used == 0 {
        out.push(b'0');
        return Ok(());
    }
    if used > MAX_BIGINT_DIGITS {
        return Err(ParserError::ValueOutOfRange);
    }
    for &digit in work[..used].iter().rev() {
        out.push(b'0' + digit);
    }
    Ok(())
}

/// Inserts a decimal point `decimals` digits from the right of `number`,
/// left-padding with zeros so there is always an integer part.
pub fn fpstr_to_str(
    number: &[u8],
    decimals: usize,
    out: &mut ArrayVec<u8, MAX_FIXED_POINT_LEN>,
) -> Result<(), ParserError> {
    out.clear();
    let overflow = |_| ParserError::ValueOutOfRange;

    if number.is_empty() {
        out.push(b'0');
        return Ok(());
    }
    if decimals == 0 {
        return out.try_extend_from_slice(number).map_err(overflow);
    }

    if number.len() <= decimals {
        out.try_extend_from_slice(b"0.").map_err(overflow)?;
        for _ in 0..decimals - number.len() {
            out.try_push(b'0').map_err(|_| ParserError::ValueOutOfRange)?;
        }
        return out.try_extend_from_slice(number).map_err(overflow);
    }

    let shift = number.len() - decimals;
    out.try_extend_from_slice(&number[..shift]).map_err(overflow)?;
    out.try_push(b'.').map_err(|_| ParserError::ValueOutOfRange)?;
    out.try_extend_from_slice(&number[shift..]).map_err(overflow)
}

/// Lowercase hex of `data` into `out`, which must be exactly twice as long.
pub fn to_hex(data: &[u8], out: &mut [u8]) -> Result<usize, ParserError> {
    hex::encode_to_slice(data, out).map_err(|_| ParserError::UnexpectedValue)?;
    Ok(data.len() * 2)
}
