use anyhow::Result;

use crate::app::App;

/// Runs the command against each target dist and reports the worst exit
/// code, which becomes the process exit code.
pub fn run(app: &App, with: &[String], command: &[String]) -> Result<i32> {
    let catalog = app.catalog()?;
    let code = strawbrew_core::exec::run(&catalog, &app.settings, app.store(), with, command)?;
    Ok(code)
}
