use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use crate::DecodeError;

type Endian = BigEndian;

/// Forward-only big-endian reader over a fully buffered byte slice.
///
/// Offsets reported in errors are relative to the start of the slice the cursor was created
/// with. A failed read leaves the position where it was.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    r: Cursor<&'a [u8]>,
}
impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(bytes),
        }
    }

    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.r.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.read_with(1, |r| r.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_with(2, |r| r.read_u16::<Endian>())
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_with(4, |r| r.read_u32::<Endian>())
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_with(4, |r| r.read_i32::<Endian>())
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_with(8, |r| r.read_u64::<Endian>())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let offset = self.position();
        if self.remaining() < n {
            return Err(DecodeError::TruncatedInput { offset, needed: n });
        }

        let bytes: &'a [u8] = *self.r.get_ref();
        self.r.set_position((offset + n) as u64);
        Ok(&bytes[offset..offset + n])
    }

    fn read_with<T>(
        &mut self,
        needed: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T, DecodeError> {
        let offset = self.position();
        if self.remaining() < needed {
            return Err(DecodeError::TruncatedInput { offset, needed });
        }

        read(&mut self.r).map_err(|_| DecodeError::TruncatedInput { offset, needed })
    }
}
