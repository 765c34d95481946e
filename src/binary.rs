//! Reading of binary font data.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DumpError, ParseError};

/// Error returned when a typed read would run past the reader's limit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReadEof {}

/// A positionable cursor over in-memory font data with a movable upper limit.
///
/// The limit masks the visible tail of the buffer. Charstring interpretation
/// enters a subroutine by narrowing the limit to the subroutine's end offset
/// and restores the previous limit on return. This is what stops the
/// interpreter from running past a corrupt length into the next glyph's
/// bytes.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    limit: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            data,
            pos: 0,
            limit: data.len(),
        }
    }

    /// Total length of the underlying buffer, regardless of the current limit.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Set the upper limit of the visible data. Clamped to the capacity.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.data.len());
    }

    /// Reset the limit to the full buffer capacity.
    pub fn unlimit(&mut self) {
        self.limit = self.data.len();
    }

    pub fn bytes_available(&self) -> bool {
        self.pos < self.limit
    }

    fn check_avail(&self, length: usize) -> Result<(), ReadEof> {
        match self.pos.checked_add(length) {
            Some(end) if end <= self.limit => Ok(()),
            _ => Err(ReadEof {}),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadEof> {
        self.check_avail(1)?;
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_i8(&mut self) -> Result<i8, ReadEof> {
        self.read_u8().map(|byte| byte as i8)
    }

    pub fn read_u16be(&mut self) -> Result<u16, ReadEof> {
        self.check_avail(2)?;
        let val = BigEndian::read_u16(&self.data[self.pos..]);
        self.pos += 2;
        Ok(val)
    }

    pub fn read_i16be(&mut self) -> Result<i16, ReadEof> {
        self.read_u16be().map(|val| val as i16)
    }

    pub fn read_u24be(&mut self) -> Result<u32, ReadEof> {
        self.check_avail(3)?;
        let val = BigEndian::read_u24(&self.data[self.pos..]);
        self.pos += 3;
        Ok(val)
    }

    pub fn read_u32be(&mut self) -> Result<u32, ReadEof> {
        self.check_avail(4)?;
        let val = BigEndian::read_u32(&self.data[self.pos..]);
        self.pos += 4;
        Ok(val)
    }

    pub fn read_i32be(&mut self) -> Result<i32, ReadEof> {
        self.read_u32be().map(|val| val as i32)
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ReadEof> {
        self.check_avail(length)?;
        let slice = &self.data[self.pos..self.pos + length];
        self.pos += length;
        Ok(slice)
    }

    /// Read an INDEX OffSize byte. Only values 1 to 4 are accepted.
    pub fn read_off_size(&mut self) -> Result<u8, DumpError> {
        let off_size = self.read_u8().map_err(ParseError::from)?;
        if (1..=4).contains(&off_size) {
            Ok(off_size)
        } else {
            Err(DumpError::InvalidOffSize(off_size))
        }
    }

    /// Read an `off_size`-byte big-endian unsigned offset.
    pub fn read_offset(&mut self, off_size: u8) -> Result<usize, DumpError> {
        let offset = match off_size {
            1 => u32::from(self.read_u8().map_err(ParseError::from)?),
            2 => u32::from(self.read_u16be().map_err(ParseError::from)?),
            3 => self.read_u24be().map_err(ParseError::from)?,
            4 => self.read_u32be().map_err(ParseError::from)?,
            _ => return Err(DumpError::InvalidOffSize(off_size)),
        };
        Ok(offset as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xff, 0xfe];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u8(), Ok(0x01));
        assert_eq!(reader.read_u16be(), Ok(0x0203));
        assert_eq!(reader.read_u8(), Ok(0x04));
        assert_eq!(reader.read_i16be(), Ok(-2));
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_read_u24be() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert_eq!(reader.read_u24be(), Ok(0x10203));
    }

    #[test]
    fn test_limit_masks_tail() {
        let data = [1u8, 2, 3, 4];
        let mut reader = ByteReader::new(&data);
        reader.set_limit(2);
        assert_eq!(reader.read_u16be(), Ok(0x0102));
        assert_eq!(reader.read_u8(), Err(ReadEof {}));

        reader.unlimit();
        assert_eq!(reader.read_u16be(), Ok(0x0304));
    }

    #[test]
    fn test_limit_clamps_to_capacity() {
        let data = [0u8; 2];
        let mut reader = ByteReader::new(&data);
        reader.set_limit(100);
        assert_eq!(reader.limit(), 2);
    }

    #[test]
    fn test_read_offset_sizes() {
        let data = [0xab, 0x01, 0x02, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_offset(1).unwrap(), 0xab);
        assert_eq!(reader.read_offset(2).unwrap(), 0x0102);
        assert_eq!(reader.read_offset(3).unwrap(), 0x010203);
        assert_eq!(reader.read_offset(4).unwrap(), 0x01020304);
    }

    #[test]
    fn test_off_size_range() {
        let mut reader = ByteReader::new(&[5]);
        assert!(matches!(
            reader.read_off_size(),
            Err(DumpError::InvalidOffSize(5))
        ));
    }
}
