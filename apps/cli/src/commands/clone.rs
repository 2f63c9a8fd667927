use anyhow::Result;

use strawbrew_core::Installer;

use crate::app::App;

pub fn run(app: &App, source: &str, dest: &str) -> Result<()> {
    let catalog = app.catalog()?;
    Installer::new(&app.settings).clone_dist(&catalog, &app.registry, source, dest)?;
    println!("\nSuccessfully installed custom perl '{dest}'");
    Ok(())
}
