use anyhow::Result;

use crate::app::App;
use crate::commands::tolerate_permission_denied;

pub fn run(app: &App) -> Result<()> {
    let catalog = app.catalog()?;
    if tolerate_permission_denied(app.paths().remove_dists(&catalog, true))?.is_some() {
        println!("strawbrew perl disabled. Open a new shell to use system perl");
    }
    Ok(())
}
