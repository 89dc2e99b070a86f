use crate::{
    common::Parcel,
    error::{Error, Result},
};
use bytes::{BufMut, BytesMut};
use std::{
    io::{ErrorKind, Read, Write},
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
};
use tracing::debug;

/// First transaction code available to service interfaces
pub const FIRST_CALL_TRANSACTION: u32 = 1;

/// Largest frame either side is willing to read
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

pub const STATUS_OK: i32 = 0;
pub const STATUS_BAD_VALUE: i32 = -22;
pub const STATUS_INVALID_OPERATION: i32 = -38;
pub const STATUS_UNKNOWN_TRANSACTION: i32 = -74;

/// Operations offered by the host platform service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Transaction {
    BootFinished = FIRST_CALL_TRANSACTION,
    UpdateWindowState = FIRST_CALL_TRANSACTION + 1,
    UpdateApplicationList = FIRST_CALL_TRANSACTION + 2,
    SetClipboardData = FIRST_CALL_TRANSACTION + 3,
    GetClipboardData = FIRST_CALL_TRANSACTION + 4,
}

impl Transaction {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Transaction {
    type Error = Error;
    fn try_from(code: u32) -> Result<Self> {
        [
            Self::BootFinished,
            Self::UpdateWindowState,
            Self::UpdateApplicationList,
            Self::SetClipboardData,
            Self::GetClipboardData,
        ]
        .into_iter()
        .find(|t| t.code() == code)
        .ok_or(Error::UnknownTransaction(code))
    }
}

/// Handle to a remote service
pub trait Binder {
    /// Perform a call and wait until the service has handled it
    fn transact(&mut self, code: u32, data: &Parcel) -> Result<Parcel>;
}

/// Facility resolving services by their well-known name
pub trait ServiceManager {
    /// Look up a service, `None` if it is not registered (yet)
    fn get_service(&self, name: &str) -> Option<Box<dyn Binder>>;
}

/// Service manager where each service is a Unix socket named after it in one directory
#[derive(Debug, Clone)]
pub struct SocketServiceManager {
    dir: PathBuf,
}

impl SocketServiceManager {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_owned(),
        }
    }

    /// Path of the socket a service is reachable at
    pub fn service_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ServiceManager for SocketServiceManager {
    #[mutants::skip] // Cannot test directly, depends on system state
    fn get_service(&self, name: &str) -> Option<Box<dyn Binder>> {
        let path = self.service_path(name);
        match UnixStream::connect(&path) {
            Ok(stream) => Some(Box::new(SocketBinder(stream))),
            Err(e) => {
                debug!(service = name, path = %path.display(), "service lookup failed: {e}");
                None
            }
        }
    }
}

/// Connection to a service exposed on a Unix socket
#[derive(Debug)]
pub struct SocketBinder(UnixStream);

impl Binder for SocketBinder {
    fn transact(&mut self, code: u32, data: &Parcel) -> Result<Parcel> {
        write_request(&mut self.0, code, data.as_bytes())?;
        match read_reply(&mut self.0)? {
            (STATUS_OK, reply) => Ok(Parcel::from_bytes(&reply)),
            (status, _) => Err(Error::BadStatus(status)),
        }
    }
}

fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|_| len <= MAX_FRAME_LEN)
        .ok_or(Error::FrameTooLarge(len))
}

fn read_payload<R: Read>(reader: &mut R, len: u32) -> Result<Vec<u8>> {
    let len = len as usize;
    if len > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(len));
    }

    let mut payload = vec![0; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Write a call: transaction code, payload length, payload
pub fn write_request<W: Write>(
    writer: &mut W,
    code: u32,
    payload: &[u8],
) -> Result<()> {
    let mut frame = BytesMut::with_capacity(8 + payload.len());
    frame.put_u32_le(code);
    frame.put_u32_le(frame_len(payload.len())?);
    frame.put_slice(payload);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read a call, `None` if the caller hung up cleanly
pub fn read_request<R: Read>(reader: &mut R) -> Result<Option<(u32, Vec<u8>)>> {
    let mut header = [0; 8];
    match reader.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let [c0, c1, c2, c3, l0, l1, l2, l3] = header;
    let code = u32::from_le_bytes([c0, c1, c2, c3]);
    let payload = read_payload(reader, u32::from_le_bytes([l0, l1, l2, l3]))?;

    Ok(Some((code, payload)))
}

/// Write the answer to a call: status, payload length, payload
pub fn write_reply<W: Write>(
    writer: &mut W,
    status: i32,
    payload: &[u8],
) -> Result<()> {
    let mut frame = BytesMut::with_capacity(8 + payload.len());
    frame.put_i32_le(status);
    frame.put_u32_le(frame_len(payload.len())?);
    frame.put_slice(payload);

    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read the answer to a call
pub fn read_reply<R: Read>(reader: &mut R) -> Result<(i32, Vec<u8>)> {
    let mut header = [0; 8];
    reader.read_exact(&mut header)?;

    let [s0, s1, s2, s3, l0, l1, l2, l3] = header;
    let status = i32::from_le_bytes([s0, s1, s2, s3]);
    let payload = read_payload(reader, u32::from_le_bytes([l0, l1, l2, l3]))?;

    Ok((status, payload))
}
