use anyhow::Result;

use strawbrew_core::{active_dist, is_installed, Catalog};

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let catalog = app.catalog()?;
    print(app, &catalog)
}

pub fn print(app: &App, catalog: &Catalog) -> Result<()> {
    println!("\nThe following Strawberry Perls are available:\n");

    let current = active_dist(catalog, app.store()).map(|d| d.name.clone());
    let width = catalog.iter().map(|d| d.name.len()).max().unwrap_or(0) + 2;

    for dist in catalog.iter() {
        let mut line = format!("\t{:<width$}", dist.name);
        if dist.custom {
            line.push_str(" [custom]");
        }
        if is_installed(dist) {
            line.push_str(" [installed]");
        }
        if current.as_deref() == Some(dist.name.as_str()) {
            line.push_str(" *");
        }
        println!("{line}");
    }

    println!("\n* Currently using");
    Ok(())
}
