//! In-memory stand-ins for the package registry and the host service

use crate::{
    apps::{ApplicationInfo, PackageRegistry},
    common::{ComponentName, LaunchIntent, Parcel},
    error::{Error, Result},
    service::{Binder, ServiceManager, STATUS_INVALID_OPERATION},
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

#[derive(Debug, Clone)]
enum FakeIcon {
    Image(DynamicImage),
    Missing,
    Broken,
}

/// A package known to a `FakeRegistry`
#[derive(Debug, Clone)]
pub struct FakePackage {
    pub info: ApplicationInfo,
    pub label: Option<String>,
    pub launch: Option<LaunchIntent>,
    icon: FakeIcon,
}

impl FakePackage {
    /// A package with a launcher activity and an icon
    pub fn launchable(package: &str) -> Self {
        Self {
            info: ApplicationInfo {
                package: package.to_owned(),
                name: None,
            },
            label: None,
            launch: Some(LaunchIntent {
                action: "android.intent.action.MAIN".to_owned(),
                component: ComponentName {
                    package: package.to_owned(),
                    class: format!("{package}.MainActivity"),
                },
                categories: vec!["android.intent.category.LAUNCHER".to_owned()],
                ..Default::default()
            }),
            icon: FakeIcon::Image(DynamicImage::ImageRgba8(
                RgbaImage::from_pixel(4, 4, Rgba([200, 40, 40, 255])),
            )),
        }
    }

    pub fn not_launchable(mut self) -> Self {
        self.launch = None;
        self
    }

    pub fn without_icon(mut self) -> Self {
        self.icon = FakeIcon::Missing;
        self
    }

    /// The icon exists but cannot be decoded
    pub fn broken_icon(mut self) -> Self {
        self.icon = FakeIcon::Broken;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.info.name = Some(name.to_owned());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }
}

/// Registry whose contents can be changed while a client holds it
#[derive(Debug, Clone, Default)]
pub struct FakeRegistry {
    packages: Rc<RefCell<Vec<FakePackage>>>,
    broken: Rc<Cell<bool>>,
}

impl FakeRegistry {
    pub fn install(&self, package: FakePackage) {
        self.packages.borrow_mut().push(package);
    }

    pub fn uninstall(&self, package: &str) {
        self.packages
            .borrow_mut()
            .retain(|p| p.info.package != package);
    }

    /// Make enumeration fail
    pub fn set_broken(&self, broken: bool) {
        self.broken.set(broken);
    }

    fn find(&self, package: &str) -> Option<FakePackage> {
        self.packages
            .borrow()
            .iter()
            .find(|p| p.info.package == package)
            .cloned()
    }
}

impl PackageRegistry for FakeRegistry {
    fn installed_applications(&self) -> Result<Vec<ApplicationInfo>> {
        if self.broken.get() {
            return Err(Error::Io(std::io::Error::other("registry went away")));
        }

        Ok(self.packages.borrow().iter().map(|p| p.info.clone()).collect())
    }

    fn launch_intent_for_package(&self, package: &str) -> Option<LaunchIntent> {
        self.find(package)?.launch
    }

    fn load_icon(&self, app: &ApplicationInfo) -> Result<DynamicImage> {
        match self.find(&app.package).map(|p| p.icon) {
            Some(FakeIcon::Image(icon)) => Ok(icon),
            Some(FakeIcon::Broken) => {
                Ok(image::load_from_memory(b"definitely not an image")?)
            }
            Some(FakeIcon::Missing) | None => {
                Err(Error::NoIcon(app.package.clone()))
            }
        }
    }

    fn load_label(&self, app: &ApplicationInfo) -> Option<String> {
        self.find(&app.package)?.label
    }
}

#[derive(Debug, Default)]
struct Recorded {
    lookups: Vec<String>,
    calls: Vec<(u32, Vec<u8>)>,
    unavailable: bool,
    failing: bool,
}

/// Service manager that hands out binders recording every call made through them
#[derive(Debug, Clone, Default)]
pub struct RecordingServiceManager(Rc<RefCell<Recorded>>);

impl RecordingServiceManager {
    /// Whether lookups find the service
    pub fn set_available(&self, available: bool) {
        self.0.borrow_mut().unavailable = !available;
    }

    /// Whether calls are rejected by the service
    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    /// Service names looked up so far
    pub fn lookups(&self) -> Vec<String> {
        self.0.borrow().lookups.clone()
    }

    /// Transaction code and payload of every call made so far
    pub fn calls(&self) -> Vec<(u32, Vec<u8>)> {
        self.0.borrow().calls.clone()
    }
}

impl ServiceManager for RecordingServiceManager {
    fn get_service(&self, name: &str) -> Option<Box<dyn Binder>> {
        let mut recorded = self.0.borrow_mut();
        recorded.lookups.push(name.to_owned());

        if recorded.unavailable {
            None
        } else {
            Some(Box::new(RecordingBinder(self.0.clone())))
        }
    }
}

struct RecordingBinder(Rc<RefCell<Recorded>>);

impl Binder for RecordingBinder {
    fn transact(&mut self, code: u32, data: &Parcel) -> Result<Parcel> {
        let mut recorded = self.0.borrow_mut();
        recorded.calls.push((code, data.as_bytes().to_vec()));

        if recorded.failing {
            Err(Error::BadStatus(STATUS_INVALID_OPERATION))
        } else {
            Ok(Parcel::new())
        }
    }
}
