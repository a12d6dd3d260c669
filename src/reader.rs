//! Sequential big-endian reader over the bytes of a class file.
use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::ClassFormatError;

type Result<T> = std::result::Result<T, ClassFormatError>;

/// `ClassReader` walks a class file front to back. The position only ever
/// moves forward and every read consumes exactly the width it decodes.
#[derive(Debug, Clone)]
pub struct ClassReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ClassReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Returns the current read offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Returns the number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(1, |c| c.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(2, |c| c.read_u16::<BigEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(4, |c| c.read_u32::<BigEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_with(8, |c| c.read_u64::<BigEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_with(4, |c| c.read_f32::<BigEndian>())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_with(8, |c| c.read_f64::<BigEndian>())
    }

    /// Reads a `u16` count followed by that many `u16` values.
    pub fn read_u16s(&mut self) -> Result<Vec<u16>> {
        let count = self.read_u16()?;
        (0..count).map(|_| self.read_u16()).collect()
    }

    /// Borrows the next `len` bytes out of the underlying buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let offset = self.position();
        if len > self.remaining() {
            return Err(ClassFormatError::Truncated {
                offset,
                needed: len,
            });
        }
        let bytes: &'a [u8] = *self.cursor.get_ref();
        let end = offset + len;
        self.cursor.set_position(end as u64);
        Ok(&bytes[offset..end])
    }

    fn read_with<T>(
        &mut self,
        needed: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T> {
        let offset = self.position();
        // Check up front so a short read never moves the cursor.
        if needed > self.remaining() {
            return Err(ClassFormatError::Truncated { offset, needed });
        }
        read(&mut self.cursor)
            .map_err(|_| ClassFormatError::Truncated { offset, needed })
    }
}
