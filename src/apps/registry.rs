use crate::{
    common::LaunchIntent,
    error::{Error, Result},
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Metadata of an installed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// Unique package identifier
    pub package: String,
    /// Raw application name from the package metadata
    #[serde(default)]
    pub name: Option<String>,
}

/// Local facility that knows about installed packages
///
/// Lookups for a single package may fail without affecting the others.
pub trait PackageRegistry {
    /// All installed applications, in registry order
    fn installed_applications(&self) -> Result<Vec<ApplicationInfo>>;
    /// The intent that starts the given package, if it is launchable at all
    fn launch_intent_for_package(&self, package: &str) -> Option<LaunchIntent>;
    /// Load the icon of an application
    fn load_icon(&self, app: &ApplicationInfo) -> Result<DynamicImage>;
    /// Load the localized label of an application
    fn load_label(&self, app: &ApplicationInfo) -> Option<String>;
}

/// One package as listed in the registry manifest
#[derive(Debug, Clone, Deserialize)]
struct PackageRecord {
    #[serde(flatten)]
    info: ApplicationInfo,
    #[serde(default)]
    label: Option<String>,
    /// Icon image, relative to the registry directory
    #[serde(default)]
    icon: Option<PathBuf>,
    #[serde(default)]
    launch: Option<LaunchIntent>,
}

/// Registry backed by a `packages.json` manifest in a directory
///
/// The manifest is re-read on every enumeration so each sync sees the current state.
#[derive(Debug)]
pub struct ManifestRegistry {
    dir: PathBuf,
    packages: RefCell<Vec<PackageRecord>>,
}

impl ManifestRegistry {
    /// File name of the manifest inside the registry directory
    pub const MANIFEST: &'static str = "packages.json";

    /// Open the registry in the given directory
    pub fn open(dir: &Path) -> Result<Self> {
        let registry = Self {
            dir: dir.to_owned(),
            packages: RefCell::default(),
        };
        registry.reload()?;
        Ok(registry)
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(Self::MANIFEST)
    }

    fn reload(&self) -> Result<()> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Err(Error::NoRegistry(path));
        }

        let file = std::fs::File::open(&path)?;
        let records: Vec<serde_json::Value> =
            serde_json::from_reader(std::io::BufReader::new(file))?;

        // A malformed record only takes its own package out of the registry
        let packages = records
            .into_iter()
            .filter_map(|record| {
                serde_json::from_value::<PackageRecord>(record)
                    .map_err(|e| debug!("Skipping malformed package record: {e}"))
                    .ok()
            })
            .collect::<Vec<_>>();

        debug!(count = packages.len(), path = %path.display(), "loaded registry manifest");
        *self.packages.borrow_mut() = packages;

        Ok(())
    }

    fn with_record<T>(
        &self,
        package: &str,
        f: impl FnOnce(&PackageRecord) -> Option<T>,
    ) -> Option<T> {
        self.packages
            .borrow()
            .iter()
            .find(|r| r.info.package == package)
            .and_then(f)
    }
}

impl PackageRegistry for ManifestRegistry {
    fn installed_applications(&self) -> Result<Vec<ApplicationInfo>> {
        self.reload()?;
        Ok(self
            .packages
            .borrow()
            .iter()
            .map(|r| r.info.clone())
            .collect())
    }

    fn launch_intent_for_package(&self, package: &str) -> Option<LaunchIntent> {
        self.with_record(package, |r| r.launch.clone())
    }

    fn load_icon(&self, app: &ApplicationInfo) -> Result<DynamicImage> {
        let path = self
            .with_record(&app.package, |r| r.icon.clone())
            .ok_or_else(|| Error::NoIcon(app.package.clone()))?;

        Ok(image::open(self.dir.join(path))?)
    }

    fn load_label(&self, app: &ApplicationInfo) -> Option<String> {
        self.with_record(&app.package, |r| r.label.clone())
            .filter(|l| !l.is_empty())
    }
}
