use crate::cbor::CborError;

/// Parser result codes.
///
/// Every operation of the crate reports failures with one of these values,
/// there is no partial success. The discriminants are the codes reported to
/// the host.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    // General errors
    #[error("No more data")]
    NoData = 1,
    #[error("Initialized empty context")]
    InitContextEmpty = 2,
    #[error("display_idx_out_of_range")]
    DisplayIdxOutOfRange = 3,
    #[error("display_page_out_of_range")]
    DisplayPageOutOfRange = 4,
    #[error("Unexepected internal error")]
    UnexpectedError = 5,

    // CBOR
    #[error("unexpected CBOR error")]
    CborUnexpected = 6,
    #[error("CBOR was not in canonical order")]
    CborNotCanonical = 7,
    #[error("Unexpected CBOR EOF")]
    CborUnexpectedEof = 8,

    // Coin specific
    #[error("tx version is not supported")]
    UnexpectedTxVersion = 9,
    #[error("Unexpected data type")]
    UnexpectedType = 10,
    #[error("Unexpected method")]
    UnexpectedMethod = 11,
    #[error("Unexpected buffer end")]
    UnexpectedBufferEnd = 12,
    #[error("Unexpected value")]
    UnexpectedValue = 13,
    #[error("Unexpected number of items")]
    UnexpectedNumberItems = 14,
    #[error("Unexpected characters")]
    UnexpectedCharacters = 15,
    #[error("Unexpected field")]
    UnexpectedField = 16,
    #[error("Value out of range")]
    ValueOutOfRange = 17,
    #[error("Invalid address format")]
    InvalidAddress = 18,
    #[error("Unexpected trailing data")]
    UnexpectedTrailingData = 19,
}

impl ParserError {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Static description suitable for the host or a debug screen.
    pub fn description(self) -> &'static str {
        match self {
            ParserError::NoData => "No more data",
            ParserError::InitContextEmpty => "Initialized empty context",
            ParserError::DisplayIdxOutOfRange => "display_idx_out_of_range",
            ParserError::DisplayPageOutOfRange => "display_page_out_of_range",
            ParserError::UnexpectedError => "Unexepected internal error",
            ParserError::CborUnexpected => "unexpected CBOR error",
            ParserError::CborNotCanonical => "CBOR was not in canonical order",
            ParserError::CborUnexpectedEof => "Unexpected CBOR EOF",
            ParserError::UnexpectedTxVersion => "tx version is not supported",
            ParserError::UnexpectedType => "Unexpected data type",
            ParserError::UnexpectedMethod => "Unexpected method",
            ParserError::UnexpectedBufferEnd => "Unexpected buffer end",
            ParserError::UnexpectedValue => "Unexpected value",
            ParserError::UnexpectedNumberItems => "Unexpected number of items",
            ParserError::UnexpectedCharacters => "Unexpected characters",
            ParserError::UnexpectedField => "Unexpected field",
            ParserError::ValueOutOfRange => "Value out of range",
            ParserError::InvalidAddress => "Invalid address format",
            ParserError::UnexpectedTrailingData => "Unexpected trailing data",
        }
    }
}

impl From<CborError> for ParserError {
    fn from(err: CborError) -> Self {
        match err {
            CborError::UnexpectedEof => ParserError::CborUnexpectedEof,
            CborError::NotCanonical => ParserError::CborNotCanonical,
            _ => ParserError::CborUnexpected,
        }
    }
}

impl From<ParserError> for u32 {
    fn from(err: ParserError) -> u32 {
        err.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbor_errors_keep_eof_and_ordering_distinct() {
        assert_eq!(
            ParserError::from(CborError::UnexpectedEof),
            ParserError::CborUnexpectedEof
        );
        assert_eq!(
            ParserError::from(CborError::NotCanonical),
            ParserError::CborNotCanonical
        );
        assert_eq!(
            ParserError::from(CborError::DataTooLarge),
            ParserError::CborUnexpected
        );
        assert_eq!(
            ParserError::from(CborError::NestingTooDeep),
            ParserError::CborUnexpected
        );
    }

    #[test]
    fn display_matches_description() {
        for err in [
            ParserError::NoData,
            ParserError::CborNotCanonical,
            ParserError::InvalidAddress,
            ParserError::UnexpectedTrailingData,
        ] {
            assert_eq!(err.to_string(), err.description());
        }
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ParserError::NoData.code(), 1);
        assert_eq!(u32::from(ParserError::InvalidAddress), 18);
    }
}
