mod binder;
mod events;
mod host;
mod platform;

pub use binder::{
    read_request, write_reply, Binder, ServiceManager, SocketServiceManager,
    Transaction, STATUS_BAD_VALUE, STATUS_INVALID_OPERATION, STATUS_OK,
    STATUS_UNKNOWN_TRANSACTION,
};
pub use events::{EventSource, PackageEvent};
pub use host::{bind, PlatformHost};
pub use platform::{PlatformService, SERVICE_NAME};
