//! Fixed little-endian byte layout for table payloads.
//!
//! Every table structure that crosses the wire (cards, seats, snapshots, hand
//! results) is written field by field through a [`PackWriter`] and read back
//! through a [`PackReader`]. Collections carry a `u8` count prefix.

use super::errors::{Result, SerializationError};

#[derive(Debug, Default)]
pub struct PackWriter {
    buf: Vec<u8>,
}

impl PackWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Write a `u8` element count. Counts above 255 can't be represented in
    /// this layout.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u8::try_from(count).map_err(|_| {
            SerializationError::InvalidFormat(format!("collection of {count} exceeds 255"))
        })?;
        self.write_u8(count);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct PackReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PackReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(SerializationError::UnexpectedEof {
                needed: N - remaining,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail if any bytes were left unread.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(SerializationError::InvalidFormat(format!(
                "{n} trailing byte(s)"
            ))),
        }
    }
}
