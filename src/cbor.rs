//! Canonical CBOR cursor.
//!
//! A [`CborValue`] points at one item inside a container (or at the single
//! top-level item of a buffer) and exposes typed reads plus advance/enter/leave
//! navigation. Only canonical encodings are accepted: integers and lengths must
//! use the shortest form, indefinite lengths are refused and map keys must be
//! sorted length-first then bytewise.

use arrayvec::ArrayVec;

/// Maximum nesting accepted while skipping over an item.
pub const MAX_NESTING: u8 = 16;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CborError {
    UnexpectedEof,
    NotCanonical,
    IllegalType,
    IllegalNumber,
    UnexpectedBreak,
    DataTooLarge,
    OutOfMemory,
    NestingTooDeep,
    AtEnd,
    ContainerNotAtEnd,
}

/// Item types, tagged with the values hosts know from tinycbor.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CborType {
    Integer = 0x00,
    ByteString = 0x40,
    TextString = 0x60,
    Array = 0x80,
    Map = 0xa0,
    Tag = 0xc0,
    Simple = 0xe0,
    Boolean = 0xf5,
    Null = 0xf6,
    Undefined = 0xf7,
    HalfFloat = 0xf9,
    Float = 0xfa,
    Double = 0xfb,
    Invalid = 0xff,
}

#[derive(Clone, Copy, Debug)]
struct Header {
    major: u8,
    info: u8,
    arg: u64,
    len: usize,
}

fn read_header(data: &[u8], pos: usize) -> Result<Header, CborError> {
    let initial = *data.get(pos).ok_or(CborError::UnexpectedEof)?;
    let major = initial >> 5;
    let info = initial & 0x1f;

    let (arg, extra) = match info {
        0..=23 => (info as u64, 0),
        24..=27 => {
            let n = 1usize << (info - 24);
            let bytes = data
                .get(pos + 1..pos + 1 + n)
                .ok_or(CborError::UnexpectedEof)?;
            let arg = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
            (arg, n)
        }
        28..=30 => return Err(CborError::IllegalNumber),
        _ => {
            return Err(match major {
                MAJOR_BYTES..=MAJOR_MAP => CborError::NotCanonical,
                MAJOR_SIMPLE => CborError::UnexpectedBreak,
                _ => CborError::IllegalNumber,
            })
        }
    };

    if major == MAJOR_SIMPLE {
        // Two-byte simple values below 32 are not well formed.
        if info == 24 && arg < 32 {
            return Err(CborError::IllegalNumber);
        }
    } else {
        let minimal = match info {
            24 => arg >= 24,
            25 => arg > 0xff,
            26 => arg > 0xffff,
            27 => arg > 0xffff_ffff,
            _ => true,
        };
        if !minimal {
            return Err(CborError::NotCanonical);
        }
    }

    Ok(Header {
        major,
        info,
        arg,
        len: 1 + extra,
    })
}

/// Offset of the first byte after the string payload starting at `start`.
fn payload_end(data: &[u8], start: usize, len: u64) -> Result<usize, CborError> {
    usize::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .filter(|end| *end <= data.len())
        .ok_or(CborError::UnexpectedEof)
}

/// Offset of the first byte after the item starting at `pos`.
fn item_end(data: &[u8], pos: usize, depth: u8) -> Result<usize, CborError> {
    let h = read_header(data, pos)?;
    let mut end = pos + h.len;

    match h.major {
        MAJOR_UNSIGNED | MAJOR_NEGATIVE | MAJOR_SIMPLE => {}
        MAJOR_BYTES | MAJOR_TEXT => end = payload_end(data, end, h.arg)?,
        MAJOR_ARRAY => {
            let depth = depth.checked_sub(1).ok_or(CborError::NestingTooDeep)?;
            for _ in 0..h.arg {
                end = item_end(data, end, depth)?;
            }
        }
        MAJOR_MAP => {
            let depth = depth.checked_sub(1).ok_or(CborError::NestingTooDeep)?;
            let mut prev_key: Option<&[u8]> = None;
            for _ in 0..h.arg {
                let key_end = item_end(data, end, depth)?;
                let key = &data[end..key_end];
                if let Some(prev) = prev_key {
                    if (prev.len(), prev) >= (key.len(), key) {
                        return Err(CborError::NotCanonical);
                    }
                }
                prev_key = Some(key);
                end = item_end(data, key_end, depth)?;
            }
        }
        _ => {
            let depth = depth.checked_sub(1).ok_or(CborError::NestingTooDeep)?;
            end = item_end(data, end, depth)?;
        }
    }

    Ok(end)
}

/// Cursor over one CBOR item.
#[derive(Clone, Copy, Debug)]
pub struct CborValue<'a> {
    data: &'a [u8],
    pos: usize,
    remaining: u64,
}

impl<'a> CborValue<'a> {
    /// Positions a cursor on the single top-level item of `data`.
    pub fn new(data: &'a [u8]) -> Result<Self, CborError> {
        read_header(data, 0)?;
        Ok(Self {
            data,
            pos: 0,
            remaining: 1,
        })
    }

    fn header(&self) -> Result<Header, CborError> {
        if self.at_end() {
            return Err(CborError::AtEnd);
        }
        read_header(self.data, self.pos)
    }

    pub fn at_end(&self) -> bool {
        self.remaining == 0
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_valid(&self) -> bool {
        self.get_type() != CborType::Invalid
    }

    pub fn get_type(&self) -> CborType {
        let Ok(h) = self.header() else {
            return CborType::Invalid;
        };
        match h.major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => CborType::Integer,
            MAJOR_BYTES => CborType::ByteString,
            MAJOR_TEXT => CborType::TextString,
            MAJOR_ARRAY => CborType::Array,
            MAJOR_MAP => CborType::Map,
            MAJOR_TAG => CborType::Tag,
            _ => match h.info {
                20 | 21 => CborType::Boolean,
                22 => CborType::Null,
                23 => CborType::Undefined,
                25 => CborType::HalfFloat,
                26 => CborType::Float,
                27 => CborType::Double,
                _ => CborType::Simple,
            },
        }
    }

    pub fn is_integer(&self) -> bool {
        self.get_type() == CborType::Integer
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(self.header(), Ok(h) if h.major == MAJOR_UNSIGNED)
    }

    pub fn is_byte_string(&self) -> bool {
        self.get_type() == CborType::ByteString
    }

    pub fn is_text_string(&self) -> bool {
        self.get_type() == CborType::TextString
    }

    pub fn is_array(&self) -> bool {
        self.get_type() == CborType::Array
    }

    pub fn is_map(&self) -> bool {
        self.get_type() == CborType::Map
    }

    pub fn is_container(&self) -> bool {
        self.is_array() || self.is_map()
    }

    pub fn get_uint64(&self) -> Result<u64, CborError> {
        let h = self.header()?;
        if h.major != MAJOR_UNSIGNED {
            return Err(CborError::IllegalType);
        }
        Ok(h.arg)
    }

    pub fn get_int64_checked(&self) -> Result<i64, CborError> {
        let h = self.header()?;
        let magnitude = i64::try_from(h.arg).map_err(|_| CborError::DataTooLarge)?;
        match h.major {
            MAJOR_UNSIGNED => Ok(magnitude),
            MAJOR_NEGATIVE => Ok(-1 - magnitude),
            _ => Err(CborError::IllegalType),
        }
    }

    pub fn array_length(&self) -> Result<u64, CborError> {
        let h = self.header()?;
        if h.major != MAJOR_ARRAY {
            return Err(CborError::IllegalType);
        }
        Ok(h.arg)
    }

    pub fn map_length(&self) -> Result<u64, CborError> {
        let h = self.header()?;
        if h.major != MAJOR_MAP {
            return Err(CborError::IllegalType);
        }
        Ok(h.arg)
    }

    fn string_payload(&self, major: u8) -> Result<&'a [u8], CborError> {
        let h = self.header()?;
        if h.major != major {
            return Err(CborError::IllegalType);
        }
        let start = self.pos + h.len;
        let end = payload_end(self.data, start, h.arg)?;
        Ok(&self.data[start..end])
    }

    /// Length of a byte or text string. The payload must be present.
    pub fn string_length(&self) -> Result<usize, CborError> {
        match self.header()?.major {
            major @ (MAJOR_BYTES | MAJOR_TEXT) => Ok(self.string_payload(major)?.len()),
            _ => Err(CborError::IllegalType),
        }
    }

    /// Borrowed payload of a byte string.
    pub fn byte_string(&self) -> Result<&'a [u8], CborError> {
        self.string_payload(MAJOR_BYTES)
    }

    pub fn copy_byte_string<const N: usize>(
        &self,
        out: &mut ArrayVec<u8, N>,
    ) -> Result<(), CborError> {
        let payload = self.string_payload(MAJOR_BYTES)?;
        out.clear();
        out.try_extend_from_slice(payload)
            .map_err(|_| CborError::OutOfMemory)
    }

    pub fn copy_text_string<const N: usize>(
        &self,
        out: &mut ArrayVec<u8, N>,
    ) -> Result<(), CborError> {
        let payload = self.string_payload(MAJOR_TEXT)?;
        out.clear();
        out.try_extend_from_slice(payload)
            .map_err(|_| CborError::OutOfMemory)
    }

    /// Offset just past the current item, checking the whole item is
    /// well formed and canonical.
    pub fn item_end(&self) -> Result<usize, CborError> {
        if self.at_end() {
            return Err(CborError::AtEnd);
        }
        item_end(self.data, self.pos, MAX_NESTING)
    }

    /// Moves to the next sibling.
    pub fn advance(&mut self) -> Result<(), CborError> {
        self.pos = self.item_end()?;
        self.remaining -= 1;
        Ok(())
    }

    /// Cursor on the first child of the current array or map. Map keys and
    /// values are separate children.
    pub fn enter_container(&self) -> Result<CborValue<'a>, CborError> {
        let h = self.header()?;
        let remaining = match h.major {
            MAJOR_ARRAY => h.arg,
            MAJOR_MAP => h.arg.checked_mul(2).ok_or(CborError::DataTooLarge)?,
            _ => return Err(CborError::IllegalType),
        };
        Ok(CborValue {
            data: self.data,
            pos: self.pos + h.len,
            remaining,
        })
    }

    /// Moves past the container `child` was entered from. Every child must
    /// have been consumed.
    pub fn leave_container(&mut self, child: &CborValue<'a>) -> Result<(), CborError> {
        if self.at_end() {
            return Err(CborError::AtEnd);
        }
        if !child.at_end() {
            return Err(CborError::ContainerNotAtEnd);
        }
        self.pos = child.pos;
        self.remaining -= 1;
        Ok(())
    }

    /// Integrity checkpoint: the cursor must still lie inside its buffer.
    pub fn checkpoint(&self) -> Result<(), CborError> {
        if self.pos > self.data.len() {
            return Err(CborError::UnexpectedEof);
        }
        Ok(())
    }
}
