use anyhow::Result;
use dialoguer::Confirm;
use regex::Regex;

use strawbrew_core::Scope;

use crate::app::App;
use crate::commands::tolerate_permission_denied;

/// PATH segments matching this are the tool's own bin directory.
fn bin_pattern() -> Regex {
    Regex::new("strawbrew.bin").unwrap()
}

pub fn run(app: &App) -> Result<()> {
    println!(
        "strawbrew {} — configure the machine PATH\n",
        env!("CARGO_PKG_VERSION")
    );

    let paths = app.paths();
    if paths.scan(&bin_pattern(), Scope::Machine) {
        println!("strawbrew is already registered on the machine PATH");
        return Ok(());
    }

    let add = Confirm::new()
        .with_prompt("Add strawbrew to the machine PATH?")
        .default(true)
        .interact()
        .unwrap_or(false);
    if !add {
        return Ok(());
    }

    let bin = app.tool_bin_dir()?;
    if tolerate_permission_denied(paths.add_tool_bin(&bin))?.is_none() {
        return Ok(());
    }

    if paths.scan(&bin_pattern(), Scope::Machine) {
        println!("strawbrew configured. Open a new shell to start using it");
    } else {
        println!("strawbrew could not verify its PATH entry; check your environment");
    }
    Ok(())
}

pub fn unconfig(app: &App) -> Result<()> {
    if tolerate_permission_denied(app.paths().remove_tool_bin(&bin_pattern()))?.is_some() {
        println!("strawbrew removed from the machine PATH");
    }
    Ok(())
}
