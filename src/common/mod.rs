mod icon;
mod listing;
mod message;
mod parcel;

pub use icon::IconFormat;
pub use listing::{entry_table, message_table};
pub use message::{
    AppEntry, ComponentName, LaunchIntent, SyncMessage, INTERFACE_TOKEN,
};
pub use parcel::{Parcel, ParcelReader};
