use crate::{
    apps::{ApplicationInfo, PackageRegistry},
    common::{AppEntry, IconFormat},
    error::Result,
};

/// Build the entries of a full sync from the current registry state
///
/// Packages without a launch intent or without a usable icon are left out.
/// Registry order is kept as is.
pub fn build_entries<R: PackageRegistry + ?Sized>(
    registry: &R,
    icon_format: IconFormat,
) -> Result<Vec<AppEntry>> {
    Ok(registry
        .installed_applications()?
        .iter()
        .filter_map(|app| build_entry(registry, app, icon_format))
        .collect())
}

fn build_entry<R: PackageRegistry + ?Sized>(
    registry: &R,
    app: &ApplicationInfo,
    icon_format: IconFormat,
) -> Option<AppEntry> {
    let launch = registry.launch_intent_for_package(&app.package)?;
    let icon = registry.load_icon(app).ok()?;

    let display_name = registry
        .load_label(app)
        .or_else(|| app.name.clone())
        .unwrap_or_else(|| app.package.clone());

    Some(AppEntry {
        display_name,
        package_id: app.package.clone(),
        launch,
        icon: icon_format.encode(&icon).ok()?,
    })
}
