//! Stream decoders that feed the dumper.
//!
//! Each decoder takes the full encoded byte slice and produces the decoded
//! bytes. The whole input is materialized before parsing begins, so there is
//! no streaming state to carry across calls.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::FilterError;

/// eexec encryption key.
const EEXEC_R: u16 = 55665;
/// Charstring encryption key.
const CHARSTRING_R: u16 = 4330;
const C1: u16 = 52845;
const C2: u16 = 22719;

/// Input data encodings that can wrap a font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    None,
    Deflate,
    AsciiHex,
    Ascii85,
}

/// Apply `filter` to `data`, returning the decoded bytes.
pub fn decode(filter: Filter, data: &[u8]) -> Result<Cow<'_, [u8]>, FilterError> {
    match filter {
        Filter::None => Ok(Cow::Borrowed(data)),
        Filter::Deflate => deflate_decode(data).map(Cow::Owned),
        Filter::AsciiHex => ascii_hex_decode(data).map(Cow::Owned),
        Filter::Ascii85 => ascii85_decode(data).map(Cow::Owned),
    }
}

fn is_hex_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x00 | 0x0c)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Decode ASCII-hex data. `>` ends the data. A lone trailing digit is padded
/// with a `'0'`.
pub fn ascii_hex_decode(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for &b in data {
        if b == b'>' {
            break;
        }
        if is_hex_whitespace(b) {
            continue;
        }
        let nibble = hex_value(b).ok_or(FilterError::InvalidHexChar(b))?;
        match pending.take() {
            Some(high) => out.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    if let Some(high) = pending {
        out.push(high << 4);
    }

    Ok(out)
}

/// Decode ASCII-85 data. `~` ends the data. A partial final group of k
/// characters contributes k - 1 bytes, padded with `'u'`.
pub fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::with_capacity(data.len() / 5 * 4);
    let mut group = [0u8; 5];
    let mut count = 0;

    for &b in data {
        if b == b'~' {
            break;
        }
        if b <= b' ' {
            continue;
        }
        if b == b'z' {
            if count > 0 {
                return Err(FilterError::InvalidAscii85Char(b));
            }
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if !(33..118).contains(&b) {
            return Err(FilterError::InvalidAscii85Char(b));
        }
        group[count] = b;
        count += 1;
        if count == 5 {
            let word = decode_ascii85_group(&group)?;
            out.extend_from_slice(&word.to_be_bytes());
            count = 0;
        }
    }

    if count > 0 {
        if count == 1 {
            return Err(FilterError::Ascii85PartialGroup(1));
        }
        for slot in group[count..].iter_mut() {
            *slot = b'u';
        }
        let word = decode_ascii85_group(&group)?;
        out.extend_from_slice(&word.to_be_bytes()[..count - 1]);
    }

    Ok(out)
}

fn decode_ascii85_group(group: &[u8; 5]) -> Result<u32, FilterError> {
    let mut word: u64 = 0;
    for &b in group {
        word = word * 85 + u64::from(b - 33);
    }
    if word > u64::from(u32::MAX) {
        return Err(FilterError::Ascii85GroupOutOfRange);
    }
    Ok(word as u32)
}

/// Decompress zlib-wrapped deflate data.
pub fn deflate_decode(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|err| FilterError::Deflate(err.to_string()))?;
    Ok(out)
}

/// Strip PFB section headers, concatenating the ASCII and binary segments.
///
/// Each segment starts with a 6-byte header: magic 0x80, a type byte
/// (1 = text, 2 = binary, 3 = end of file), and a little-endian 32-bit
/// length. The type-3 header terminates the data.
pub fn pfb_strip(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::with_capacity(data.len());
    let mut pos = 0;

    loop {
        let magic = *data.get(pos).ok_or(FilterError::PfbTruncated)?;
        pos += 1;
        if magic != 0x80 {
            return Err(FilterError::BadPfbMagic(magic));
        }
        let segment_type = *data.get(pos).ok_or(FilterError::PfbTruncated)?;
        pos += 1;
        match segment_type {
            3 => break,
            1 | 2 => {
                let header = data.get(pos..pos + 4).ok_or(FilterError::PfbTruncated)?;
                let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
                pos += 4;
                let end = pos
                    .checked_add(length as usize)
                    .filter(|&end| end <= data.len())
                    .ok_or(FilterError::PfbTruncated)?;
                out.extend_from_slice(&data[pos..end]);
                pos = end;
            }
            _ => return Err(FilterError::BadPfbSegmentType(segment_type)),
        }
    }

    Ok(out)
}

/// The 16-bit keyed stream cipher shared by eexec and charstring encryption.
struct Decrypt {
    r: u16,
}

impl Decrypt {
    fn new(r: u16) -> Self {
        Decrypt { r }
    }

    fn next(&mut self, cipher: u8) -> u8 {
        let plain = cipher ^ (self.r >> 8) as u8;
        self.r = u16::from(cipher)
            .wrapping_add(self.r)
            .wrapping_mul(C1)
            .wrapping_add(C2);
        plain
    }
}

fn decrypt(cipher: &[u8], r: u16, discard: usize) -> Vec<u8> {
    let mut state = Decrypt::new(r);
    let mut out = Vec::with_capacity(cipher.len().saturating_sub(discard));
    for (i, &c) in cipher.iter().enumerate() {
        let plain = state.next(c);
        if i >= discard {
            out.push(plain);
        }
    }
    out
}

/// Decrypt the eexec-encrypted section of a Type 1 font.
///
/// Whitespace after the `eexec` keyword (space, LF, CR, tab only) is skipped
/// first. If any of the first four raw bytes is not a hex digit, the data is
/// binary; otherwise an ASCII-hex layer is decoded below the cipher. The
/// first four plaintext bytes initialize the key and are discarded.
pub fn eexec_decrypt(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    let start = data
        .iter()
        .position(|&b| !matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
        .ok_or(FilterError::MissingEexecData)?;
    let data = &data[start..];
    if data.len() < 4 {
        return Err(FilterError::MissingEexecData);
    }

    let is_binary = data[..4].iter().any(|&b| hex_value(b).is_none());
    let raw = if is_binary {
        Cow::Borrowed(data)
    } else {
        Cow::Owned(ascii_hex_decode(data)?)
    };
    if raw.len() < 4 {
        return Err(FilterError::MissingEexecData);
    }

    Ok(decrypt(&raw, EEXEC_R, 4))
}

/// Decrypt one charstring of a Type 1 font. The first `len_iv` plaintext
/// bytes initialize the key and are discarded.
pub fn charstring_decrypt(data: &[u8], len_iv: usize) -> Vec<u8> {
    decrypt(data, CHARSTRING_R, len_iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Inverse of `decrypt`, for building test data.
    fn encrypt(plain: &[u8], mut r: u16) -> Vec<u8> {
        let mut out = Vec::with_capacity(plain.len());
        for &p in plain {
            let c = p ^ (r >> 8) as u8;
            r = u16::from(c).wrapping_add(r).wrapping_mul(C1).wrapping_add(C2);
            out.push(c);
        }
        out
    }

    #[test]
    fn test_ascii_hex_decode() {
        assert_eq!(ascii_hex_decode(b"48 65 6C 6c 6F").unwrap(), b"Hello");
        assert_eq!(ascii_hex_decode(b"48656C>6C").unwrap(), b"Hel");
    }

    #[test]
    fn test_ascii_hex_pads_lone_digit() {
        assert_eq!(ascii_hex_decode(b"ABC").unwrap(), vec![0xab, 0xc0]);
    }

    #[test]
    fn test_ascii_hex_rejects_garbage() {
        assert_eq!(
            ascii_hex_decode(b"4G"),
            Err(FilterError::InvalidHexChar(b'G'))
        );
    }

    #[test]
    fn test_ascii85_decode() {
        // "Man " encodes to "9jqo^"
        assert_eq!(ascii85_decode(b"9jqo^").unwrap(), b"Man ");
        // 'z' is four zero bytes
        assert_eq!(ascii85_decode(b"z").unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_ascii85_partial_group() {
        // "Man" is a final group of four characters -> three bytes
        assert_eq!(ascii85_decode(b"9jqo~>").unwrap(), b"Man");
    }

    #[test]
    fn test_ascii85_z_mid_group_fails() {
        assert_eq!(
            ascii85_decode(b"9z"),
            Err(FilterError::InvalidAscii85Char(b'z'))
        );
    }

    #[test]
    fn test_ascii85_single_trailing_char_fails() {
        assert_eq!(
            ascii85_decode(b"9jqo^9"),
            Err(FilterError::Ascii85PartialGroup(1))
        );
    }

    #[test]
    fn test_ascii85_group_overflow() {
        assert_eq!(
            ascii85_decode(b"uuuuu"),
            Err(FilterError::Ascii85GroupOutOfRange)
        );
    }

    #[test]
    fn test_pfb_strip() {
        let mut data = vec![0x80, 0x01, 3, 0, 0, 0];
        data.extend_from_slice(b"abc");
        data.extend_from_slice(&[0x80, 0x02, 2, 0, 0, 0]);
        data.extend_from_slice(&[0xde, 0xad]);
        data.extend_from_slice(&[0x80, 0x03]);
        assert_eq!(pfb_strip(&data).unwrap(), b"abc\xde\xad");
    }

    #[test]
    fn test_pfb_bad_magic() {
        assert_eq!(pfb_strip(&[0x7f, 0x01]), Err(FilterError::BadPfbMagic(0x7f)));
    }

    #[test]
    fn test_eexec_binary_roundtrip() {
        let mut plain = vec![0u8; 4]; // garbage bytes that seed the key
        plain.extend_from_slice(b"/Private 5 dict dup begin");
        let cipher = encrypt(&plain, EEXEC_R);
        // First cipher byte is 0 ^ 0xD9 = 0xD9, which is not a hex digit,
        // so the data is detected as binary.
        let decrypted = eexec_decrypt(&cipher).unwrap();
        assert_eq!(decrypted, b"/Private 5 dict dup begin");
    }

    #[test]
    fn test_eexec_hex_roundtrip() {
        let mut plain = vec![0u8; 4];
        plain.extend_from_slice(b"dup begin");
        let cipher = encrypt(&plain, EEXEC_R);
        let mut hex = String::new();
        for b in cipher {
            hex.push_str(&format!("{:02X}", b));
        }
        let decrypted = eexec_decrypt(format!("\r\n {}", hex).as_bytes()).unwrap();
        assert_eq!(decrypted, b"dup begin");
    }

    #[test]
    fn test_charstring_decrypt() {
        let mut plain = vec![0u8; 4];
        plain.extend_from_slice(&[139, 13, 14]);
        let cipher = encrypt(&plain, CHARSTRING_R);
        assert_eq!(charstring_decrypt(&cipher, 4), vec![139, 13, 14]);
    }

    #[test]
    fn test_deflate_decode_bad_data() {
        assert!(deflate_decode(&[0x00, 0x01, 0x02]).is_err());
    }
}
