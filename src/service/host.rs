use crate::{
    common::{Parcel, SyncMessage},
    error::Result,
    service::{
        read_request, write_reply, Transaction, STATUS_BAD_VALUE,
        STATUS_INVALID_OPERATION, STATUS_OK, STATUS_UNKNOWN_TRANSACTION,
    },
};
use std::{
    fs,
    io::{Read, Write},
    os::unix::net::UnixListener,
    path::Path,
};
use tracing::{info, warn};

/// Host side of the platform service, receiving application list updates
pub struct PlatformHost<F> {
    on_update: F,
}

impl<F: FnMut(SyncMessage) -> Result<()>> PlatformHost<F> {
    pub fn new(on_update: F) -> Self {
        Self { on_update }
    }

    /// Handle a single call, returning the status and reply for the caller
    pub fn on_transact(&mut self, code: u32, data: &[u8]) -> (i32, Parcel) {
        let status = match Transaction::try_from(code) {
            Ok(Transaction::UpdateApplicationList) => {
                match SyncMessage::decode(data).and_then(&mut self.on_update) {
                    Ok(()) => STATUS_OK,
                    Err(e) => {
                        warn!("Rejected application list update: {e}");
                        STATUS_BAD_VALUE
                    }
                }
            }
            Ok(Transaction::BootFinished) => {
                info!("Guest finished booting");
                STATUS_OK
            }
            Ok(other) => {
                warn!(?other, "Unsupported platform service call");
                STATUS_INVALID_OPERATION
            }
            Err(e) => {
                warn!("{e}");
                STATUS_UNKNOWN_TRANSACTION
            }
        };

        (status, Parcel::new())
    }

    /// Answer calls on one connection until the caller hangs up
    pub fn serve_connection<S: Read + Write>(&mut self, stream: &mut S) -> Result<()> {
        while let Some((code, data)) = read_request(stream)? {
            let (status, reply) = self.on_transact(code, &data);
            write_reply(stream, status, reply.as_bytes())?;
        }

        Ok(())
    }

    /// Accept connections one after another, forever
    #[mutants::skip] // Cannot test directly, never returns
    pub fn serve(&mut self, listener: &UnixListener) -> Result<()> {
        for stream in listener.incoming() {
            let mut stream = stream?;
            if let Err(e) = self.serve_connection(&mut stream) {
                warn!("Dropping platform service connection: {e}");
            }
        }

        Ok(())
    }
}

/// Listen on a service socket, replacing a stale one left behind by an earlier host
#[mutants::skip] // Cannot test directly, alters system state
pub fn bind(path: &Path) -> Result<UnixListener> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    if path.exists() {
        fs::remove_file(path)?;
    }

    let listener = UnixListener::bind(path)?;
    info!(path = %path.display(), "Platform service listening");
    Ok(listener)
}
