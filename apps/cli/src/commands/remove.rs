use anyhow::Result;

use strawbrew_core::Installer;

use crate::app::App;

/// Returns whether the removed dist was a custom one, so the caller can
/// bypass the end-of-run orphan advisory.
pub fn run(app: &App, name: &str) -> Result<bool> {
    let catalog = app.catalog()?;
    let installer = Installer::new(&app.settings);
    let was_custom = installer.remove(&catalog, app.store(), &app.registry, name)?;
    println!("Successfully removed Strawberry Perl {name}");
    Ok(was_custom)
}
