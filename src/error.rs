//! Error types

use std::fmt;

use rustc_hash::FxHashMap;

use crate::binary::ReadEof;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    MissingValue,
    NotImplemented,
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::MissingValue => write!(f, "an expected data value was missing"),
            ParseError::NotImplemented => write!(f, "feature not implemented"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors from the stream decoders that feed the dumper.
///
/// These are fatal for the font being processed: a font behind a corrupt
/// filter cannot be partially analyzed.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FilterError {
    InvalidHexChar(u8),
    InvalidAscii85Char(u8),
    Ascii85GroupOutOfRange,
    Ascii85PartialGroup(usize),
    BadPfbMagic(u8),
    BadPfbSegmentType(u8),
    PfbTruncated,
    MissingEexecData,
    Deflate(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidHexChar(b) => {
                write!(f, "invalid hex character {}", char::from(*b))
            }
            FilterError::InvalidAscii85Char(b) => {
                write!(f, "illegal ASCII85 character '{}'", char::from(*b))
            }
            FilterError::Ascii85GroupOutOfRange => {
                write!(f, "value of ASCII85 group is out of range")
            }
            FilterError::Ascii85PartialGroup(n) => {
                write!(f, "illegal ASCII85 final group of {} character(s)", n)
            }
            FilterError::BadPfbMagic(b) => write!(f, "invalid Type1 PFB header magic: {}", b),
            FilterError::BadPfbSegmentType(b) => write!(f, "invalid Type1 PFB header type: {}", b),
            FilterError::PfbTruncated => write!(
                f,
                "unexpected end of Type1 PFB data while reading section header"
            ),
            FilterError::MissingEexecData => write!(f, "cannot find start of eexec data"),
            FilterError::Deflate(msg) => write!(f, "deflate error: {}", msg),
        }
    }
}

impl std::error::Error for FilterError {}

/// Error returned when the dumper cannot recognize the input file type.
///
/// Carries the first four bytes of the data so the message can suggest what
/// the file probably is.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FileFormatError {
    pub magic: [u8; 4],
}

impl FileFormatError {
    pub fn new(magic: u32) -> Self {
        FileFormatError {
            magic: magic.to_be_bytes(),
        }
    }
}

impl fmt::Display for FileFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.magic {
            [b'O', b'T', b'T', b'O'] => {
                write!(f, "Incorrect format selected. This might be an OpenType-CFF font.")
            }
            [b'%', b'!', b'P', b'S'] => {
                write!(f, "Incorrect format selected. This might be a Type1 font.")
            }
            [0x80, 0x01, ..] => {
                write!(f, "Incorrect format selected. This might be a Type1 (.pfb) font.")
            }
            [b'%', b'P', b'D', b'F'] => write!(
                f,
                "When analyzing a font in PDF, start offset and data filter are needed."
            ),
            [b'w', b'O', b'F', b'F'] => write!(f, "WOFF is not supported"),
            [b'w', b'O', b'F', b'2'] => write!(f, "WOFF2 is not supported"),
            [b'x', ..] => write!(f, "Check data filter. Flate decode might be needed."),
            [0x01, 0x00, ..] => write!(
                f,
                "Incorrect format selected. This might be raw CFF data (or TrueType (unsupported))."
            ),
            _ => write!(f, "Unsupported data format. Check also offset and data filter."),
        }
    }
}

impl std::error::Error for FileFormatError {}

/// Unrecoverable errors raised while dumping a font.
///
/// Recoverable problems are recorded in the [`ErrorRegister`] instead and the
/// dump continues past them.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DumpError {
    Parse(ParseError),
    Filter(FilterError),
    Format(FileFormatError),
    Cff2NotSupported,
    MultipleFontNames,
    MultipleTopDicts,
    NoFonts,
    RemovedFont,
    SyntheticFont,
    MultipleMaster,
    NoCharStrings,
    InvalidOffSize(u8),
    InvalidCharsetFormat(u8),
    InvalidEncodingFormat(u8),
    InvalidFdSelectFormat(u8),
    MissingDictKey(&'static str),
    MissingFdSelect,
    FdIndexNotFound(usize),
    GlyphNotFound(String),
    GlyphIndexOutOfBounds(usize),
    InvalidGlyphId(String),
    StackOverflow,
    StackUnderflow,
    InvalidCharstringByte(u8),
    CharstringEnd(&'static str),
    CffTableNotFound,
    TokenLimitExceeded,
    NoFontData,
}

impl From<ParseError> for DumpError {
    fn from(error: ParseError) -> Self {
        DumpError::Parse(error)
    }
}

impl From<ReadEof> for DumpError {
    fn from(error: ReadEof) -> Self {
        DumpError::Parse(ParseError::from(error))
    }
}

impl From<FilterError> for DumpError {
    fn from(error: FilterError) -> Self {
        DumpError::Filter(error)
    }
}

impl From<FileFormatError> for DumpError {
    fn from(error: FileFormatError) -> Self {
        DumpError::Format(error)
    }
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Parse(err) => write!(f, "parse error: {}", err),
            DumpError::Filter(err) => write!(f, "filter error: {}", err),
            DumpError::Format(err) => err.fmt(f),
            DumpError::Cff2NotSupported => write!(f, "CFF2 font is not supported"),
            DumpError::MultipleFontNames => write!(
                f,
                "Cannot analyze font that has more than one font name in Name INDEX"
            ),
            DumpError::MultipleTopDicts => write!(
                f,
                "Cannot analyze font that has more than one dictionary in Top DICT INDEX"
            ),
            DumpError::NoFonts => write!(f, "CFF contains no fonts"),
            DumpError::RemovedFont => {
                write!(f, "Cannot analyze a CFF font that has been removed from file.")
            }
            DumpError::SyntheticFont => write!(f, "Cannot analyze a synthetic CFF font"),
            DumpError::MultipleMaster => {
                write!(f, "Unable to dump a Multiple Master font (DICT operator 24).")
            }
            DumpError::NoCharStrings => write!(f, "Font has no charstrings"),
            DumpError::InvalidOffSize(n) => write!(f, "Invalid OffSize value {}", n),
            DumpError::InvalidCharsetFormat(n) => write!(f, "Invalid CFF Charset format {}", n),
            DumpError::InvalidEncodingFormat(n) => write!(f, "Invalid CFF Encoding format {}", n),
            DumpError::InvalidFdSelectFormat(n) => write!(f, "Invalid FDSelect format {}", n),
            DumpError::MissingDictKey(key) => write!(f, "DICT key {} is missing", key),
            DumpError::MissingFdSelect => write!(f, "FDSelect is missing"),
            DumpError::FdIndexNotFound(gid) => {
                write!(f, "Cannot find FD index for GID {}", gid)
            }
            DumpError::GlyphNotFound(id) => {
                write!(f, "Cannot find glyph {} for single glyph dump", id)
            }
            DumpError::GlyphIndexOutOfBounds(gid) => {
                write!(f, "Glyph index {} is out of bounds", gid)
            }
            DumpError::InvalidGlyphId(id) => {
                write!(f, "Invalid glyph index for single glyph dump: {}", id)
            }
            DumpError::StackOverflow => write!(f, "Type 2 stack overflow"),
            DumpError::StackUnderflow => write!(f, "Type 2 stack underflow"),
            DumpError::InvalidCharstringByte(b) => {
                write!(f, "Illegal Type 2 number (byte {})", b)
            }
            DumpError::CharstringEnd(what) => {
                write!(f, "End of charstring while reading {}", what)
            }
            DumpError::CffTableNotFound => {
                write!(f, "Cannot find 'CFF ' table in OpenType file")
            }
            DumpError::TokenLimitExceeded => write!(f, "Font parser in infinite loop"),
            DumpError::NoFontData => write!(f, "Type1 font has no data"),
        }
    }
}

impl std::error::Error for DumpError {}

/// Collects diagnostic messages, coalescing repeats by message.
///
/// Messages keep their first-seen order so the trailer of the dump is
/// deterministic for a given input.
#[derive(Default)]
pub struct ErrorRegister {
    messages: Vec<(String, u32)>,
    index: FxHashMap<String, usize>,
}

impl ErrorRegister {
    pub fn new() -> Self {
        ErrorRegister::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.index.get(&message) {
            Some(&i) => self.messages[i].1 += 1,
            None => {
                self.index.insert(message.clone(), self.messages.len());
                self.messages.push((message, 1));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.messages.iter().map(|(msg, count)| (msg.as_str(), *count))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_coalesces_repeats() {
        let mut reg = ErrorRegister::new();
        reg.add("first");
        reg.add("second");
        reg.add("first");
        reg.add("first");

        let collected: Vec<_> = reg.iter().collect();
        assert_eq!(collected, vec![("first", 3), ("second", 1)]);
    }

    #[test]
    fn test_register_keeps_insertion_order() {
        let mut reg = ErrorRegister::new();
        for msg in ["z", "a", "m"] {
            reg.add(msg);
        }
        let order: Vec<_> = reg.iter().map(|(msg, _)| msg).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }
}
