use anyhow::Result;
use clap::ValueEnum;

use strawbrew_core::Reconciler;

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CleanTarget {
    /// Delete downloaded archives from the cache
    Temp,
    /// Delete install directories no version accounts for
    Orphan,
}

pub fn run(app: &App, target: CleanTarget) -> Result<()> {
    let catalog = app.catalog()?;
    let reconciler = Reconciler::new(&app.settings, &catalog);

    match target {
        CleanTarget::Temp => {
            if reconciler.clean_archive_cache()? {
                println!(
                    "\nremoved all files from {} temp dir",
                    app.settings.temp_dir.display()
                );
            } else {
                println!("\nno archived perl installation files to remove");
            }
        }
        CleanTarget::Orphan => {
            if reconciler.clean_orphans()? == 0 {
                println!("\nno orphaned perls to remove");
            }
        }
    }
    Ok(())
}
