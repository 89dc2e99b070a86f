use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// Length written by legacy writers in place of a null string
const NULL_STRING: i32 = -1;

/// A flat buffer of values exchanged with the host platform service
///
/// Integers are 32-bit little endian, strings are a UTF-16 code unit count followed by
/// the code units, and byte arrays are a byte count followed by the raw bytes.
/// Nothing is padded or aligned, so the encoded size depends only on the values written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parcel {
    data: BytesMut,
}

impl Parcel {
    /// Create an empty parcel
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already serialized data, e.g. a reply from the host
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: BytesMut::from(data),
        }
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.put_i32_le(value);
    }

    /// Write a count or length, which must fit in an int32
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::TooLong(len))?;
        self.write_i32(len);
        Ok(())
    }

    pub fn write_string16(&mut self, value: &str) -> Result<()> {
        let units = value.encode_utf16().collect::<Vec<u16>>();
        self.write_len(units.len())?;
        units.into_iter().for_each(|u| self.data.put_u16_le(u));
        Ok(())
    }

    pub fn write_byte_array(&mut self, value: &[u8]) -> Result<()> {
        self.write_len(value.len())?;
        self.data.put_slice(value);
        Ok(())
    }

    /// Write the descriptor of the interface the receiving service must implement
    pub fn write_interface_token(&mut self, token: &str) -> Result<()> {
        self.write_string16(token)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read the parcel back from the start
    pub fn reader(&self) -> ParcelReader<'_> {
        ParcelReader::new(&self.data)
    }
}

/// Sequential, bounds-checked reader over serialized parcel data
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
}

impl<'a> ParcelReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            Err(Error::Truncated {
                needed,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.data.get_i32_le())
    }

    /// Read a count or length, rejecting negative values
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| Error::BadLength(len))
    }

    /// Read a string, treating a null string as empty
    pub fn read_string16(&mut self) -> Result<String> {
        let len = match self.read_i32()? {
            NULL_STRING => return Ok(String::new()),
            len => usize::try_from(len).map_err(|_| Error::BadLength(len))?,
        };

        self.ensure(len.saturating_mul(2))?;
        let units = (0..len).map(|_| self.data.get_u16_le()).collect::<Vec<u16>>();

        Ok(String::from_utf16(&units)?)
    }

    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        self.ensure(len)?;
        let (bytes, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(bytes.to_vec())
    }

    /// Check that the data was written for the expected interface
    pub fn enforce_interface(&mut self, token: &str) -> Result<()> {
        match self.read_string16()? {
            t if t == token => Ok(()),
            t => Err(Error::BadInterfaceToken(t)),
        }
    }

    /// Consume the reader, failing if anything is left unread
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }
}
