use crate::{
    apps::{build_entries, PackageRegistry},
    common::{IconFormat, SyncMessage},
    error::Result,
    service::{Binder, ServiceManager, Transaction},
};
use tracing::{debug, info, warn};

/// Well-known name the host platform service is registered under
pub const SERVICE_NAME: &str = "org.anbox.PlatformService";

/// Client side of the host platform service
///
/// Delivery is best effort: a missing registry, a host that cannot be found or a failed
/// call all end up as a skipped update and are never reported to the caller.
/// The next update corrects whatever was missed.
pub struct PlatformService<R, M> {
    registry: Option<R>,
    service_manager: M,
    service_name: String,
    /// Resolved on first use, until then lookup is retried on every send
    service: Option<Box<dyn Binder>>,
    icon_format: IconFormat,
}

impl<R: PackageRegistry, M: ServiceManager> PlatformService<R, M> {
    pub fn new(registry: Option<R>, service_manager: M) -> Self {
        if registry.is_none() {
            warn!("No package registry available, application list updates are disabled");
        }

        Self {
            registry,
            service_manager,
            service_name: SERVICE_NAME.to_owned(),
            service: None,
            icon_format: IconFormat::default(),
        }
    }

    /// Use a different name to look up the host service
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Compress icons to the given format
    pub fn with_icon_format(mut self, icon_format: IconFormat) -> Self {
        self.icon_format = icon_format;
        self
    }

    fn connect_service(&mut self) {
        if self.service.is_none() {
            self.service = self.service_manager.get_service(&self.service_name);
            if self.service.is_some() {
                info!(service = %self.service_name, "Connected to platform service");
            }
        }
    }

    /// Send the complete list of launchable applications to the host
    pub fn send_application_list_update(&mut self) {
        self.connect_service();

        let Some(registry) = &self.registry else {
            return;
        };
        if self.service.is_none() {
            return;
        }

        match build_entries(registry, self.icon_format) {
            Ok(entries) => self.send(SyncMessage::full(entries)),
            Err(e) => warn!("Failed to enumerate installed applications: {e}"),
        }
    }

    /// Tell the host a package was uninstalled
    pub fn notify_package_removed(&mut self, package: &str) {
        self.connect_service();

        if self.registry.is_none() || self.service.is_none() {
            return;
        }

        self.send(SyncMessage::removal(package));
    }

    fn send(&mut self, message: SyncMessage) {
        let Some(service) = self.service.as_mut() else {
            return;
        };

        if let Err(e) = transact(&mut **service, &message) {
            warn!("Failed to send application list update to the platform service: {e}");
        }
    }
}

fn transact(service: &mut dyn Binder, message: &SyncMessage) -> Result<()> {
    let data = message.encode()?;
    debug!(
        added = message.added.len(),
        removed = message.removed.len(),
        bytes = data.len(),
        "sending application list update"
    );

    // The reply carries nothing of interest
    let _reply =
        service.transact(Transaction::UpdateApplicationList.code(), &data)?;
    Ok(())
}
