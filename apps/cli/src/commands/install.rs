use anyhow::{bail, Result};
use dialoguer::Confirm;
use std::fs;

use strawbrew_core::{Error, Installer};

use crate::app::App;

pub fn run(app: &App, name: &str) -> Result<()> {
    let catalog = app.catalog()?;
    let dist = catalog.resolve(name)?;
    let installer = Installer::new(&app.settings);

    let archive = match installer.fetch(dist) {
        Ok(archive) => archive,
        Err(Error::ChecksumMismatch {
            archive,
            expected,
            actual,
        }) => {
            eprintln!(
                "Error checksum of downloaded archive\n{}\ndoes not match expected output\n\
                 expected: {expected}\n     got: {actual}",
                archive.display()
            );
            let delete = Confirm::new()
                .with_prompt("Would you like strawbrew to delete the corrupted download file?")
                .default(false)
                .interact()
                .unwrap_or(false);
            if delete {
                match fs::remove_file(&archive) {
                    Ok(()) => println!("Deleted! Try to install it again!"),
                    Err(_) => println!("Unable to delete {}", archive.display()),
                }
            }
            bail!("install of {name} aborted: archive integrity check failed");
        }
        Err(e) => return Err(e.into()),
    };

    installer.extract(dist, &archive)?;
    super::available::print(app, &catalog)?;
    Ok(())
}
