use crate::{
    common::{Parcel, ParcelReader},
    error::Result,
};
use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Descriptor of the interface implemented by the host platform service
pub const INTERFACE_TOKEN: &str = "org.anbox.IPlatformService";

/// The concrete entry point component of an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentName {
    /// Package the component lives in
    pub package: String,
    /// Fully qualified class name of the component
    pub class: String,
}

/// Everything the host needs to start an application
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchIntent {
    pub action: String,
    /// Data URI, passed through untouched since Android URIs are often not absolute URLs
    #[serde(default)]
    pub data: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, rename = "type")]
    pub mime_type: Option<Mime>,
    pub component: ComponentName,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl LaunchIntent {
    fn write_to(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_string16(&self.action)?;
        // Absent values are still written, as empty strings
        parcel.write_string16(self.data.as_deref().unwrap_or_default())?;
        parcel.write_string16(
            self.mime_type.as_ref().map_or("", |m| m.as_ref()),
        )?;
        parcel.write_string16(&self.component.package)?;
        parcel.write_string16(&self.component.class)?;

        parcel.write_len(self.categories.len())?;
        self.categories
            .iter()
            .try_for_each(|c| parcel.write_string16(c))
    }

    fn read_from(reader: &mut ParcelReader<'_>) -> Result<Self> {
        let action = reader.read_string16()?;
        let data = non_empty(reader.read_string16()?);
        let mime_type = non_empty(reader.read_string16()?)
            .map(|s| s.parse::<Mime>())
            .transpose()?;
        let component = ComponentName {
            package: reader.read_string16()?,
            class: reader.read_string16()?,
        };

        let count = reader.read_len()?;
        let categories = (0..count)
            .map(|_| reader.read_string16())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            action,
            data,
            mime_type,
            component,
            categories,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// A launchable application as presented to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub display_name: String,
    pub package_id: String,
    pub launch: LaunchIntent,
    /// Encoded raster image of the application's icon
    pub icon: Vec<u8>,
}

impl AppEntry {
    fn write_to(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_string16(&self.display_name)?;
        parcel.write_string16(&self.package_id)?;
        self.launch.write_to(parcel)?;
        parcel.write_byte_array(&self.icon)
    }

    fn read_from(reader: &mut ParcelReader<'_>) -> Result<Self> {
        Ok(Self {
            display_name: reader.read_string16()?,
            package_id: reader.read_string16()?,
            launch: LaunchIntent::read_from(reader)?,
            icon: reader.read_byte_array()?,
        })
    }
}

/// One application list update sent to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncMessage {
    /// Applications that were added or updated
    pub added: Vec<AppEntry>,
    /// Packages that are no longer installed
    pub removed: Vec<String>,
}

impl SyncMessage {
    /// A message carrying the complete set of eligible applications
    pub fn full(entries: Vec<AppEntry>) -> Self {
        Self {
            added: entries,
            removed: Vec::new(),
        }
    }

    /// A message reporting exactly one uninstalled package
    pub fn removal(package: impl Into<String>) -> Self {
        Self {
            added: Vec::new(),
            removed: vec![package.into()],
        }
    }

    /// Serialize the message into a parcel ready to be sent to the host
    pub fn encode(&self) -> Result<Parcel> {
        let mut parcel = Parcel::new();
        parcel.write_interface_token(INTERFACE_TOKEN)?;

        parcel.write_len(self.added.len())?;
        self.added
            .iter()
            .try_for_each(|entry| entry.write_to(&mut parcel))?;

        parcel.write_len(self.removed.len())?;
        self.removed
            .iter()
            .try_for_each(|package| parcel.write_string16(package))?;

        Ok(parcel)
    }

    /// Parse a message as received by the host
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = ParcelReader::new(data);
        reader.enforce_interface(INTERFACE_TOKEN)?;

        let count = reader.read_len()?;
        let added = (0..count)
            .map(|_| AppEntry::read_from(&mut reader))
            .collect::<Result<Vec<_>>>()?;

        let count = reader.read_len()?;
        let removed = (0..count)
            .map(|_| reader.read_string16())
            .collect::<Result<Vec<_>>>()?;

        reader.finish()?;

        Ok(Self { added, removed })
    }
}
