use anyhow::{bail, Result};

use strawbrew_core::is_installed;

use crate::app::App;
use crate::commands::tolerate_permission_denied;

pub fn run(app: &App, name: &str) -> Result<()> {
    let catalog = app.catalog()?;
    let dist = catalog.resolve(name)?;

    if !is_installed(dist) {
        bail!(
            "Perl version {name} is not installed. Run the command:\n\n\tstrawbrew install {name}"
        );
    }

    let paths = app.paths();
    if tolerate_permission_denied(paths.remove_dists(&catalog, true))?.is_none() {
        return Ok(());
    }
    tolerate_permission_denied(paths.add_dist(dist))?;

    println!("Switched to {name}, start a new terminal to use it.");
    Ok(())
}
