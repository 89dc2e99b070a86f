mod builder;
mod registry;

pub use builder::build_entries;
pub use registry::{ApplicationInfo, ManifestRegistry, PackageRegistry};
