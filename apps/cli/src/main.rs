use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod commands;

use commands::clean::CleanTarget;

#[derive(Parser)]
#[command(name = "strawbrew")]
#[command(version)]
#[command(about = "Manage coexisting Strawberry Perl installs and switch the active one", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, verify, and extract a Perl version
    Install { name: String },
    /// Delete an installed Perl and its registration
    Remove { name: String },
    /// Make a version the active Perl on the machine PATH
    Switch { name: String },
    /// Take every managed Perl off the machine PATH
    Off,
    /// List known versions with their install state
    Available,
    /// Remove leftovers: cached archives or orphaned installs
    Clean {
        #[arg(value_enum, default_value = "temp")]
        target: CleanTarget,
    },
    /// Run a command against every installed Perl
    Exec {
        /// Comma-separated subset of versions to run against
        #[arg(long, value_delimiter = ',')]
        with: Vec<String>,
        /// The command and its arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Copy an installed Perl to a new custom name
    Clone { source: String, dest: String },
    /// Put the strawbrew bin directory on the machine PATH
    Config,
    /// Take the strawbrew bin directory off the machine PATH
    Unconfig,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("\n{} {:#}", console::style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    let app = app::App::bootstrap()?;

    // Clone and custom-remove legitimately finish with disk and catalog
    // briefly out of step; they bypass the end-of-run orphan advisory.
    let mut bypass_orphan_check = false;
    let mut exit_code = 0;

    match cli.command {
        Commands::Install { name } => commands::install::run(&app, &name)?,
        Commands::Remove { name } => {
            bypass_orphan_check = commands::remove::run(&app, &name)?;
        }
        Commands::Switch { name } => commands::switch::run(&app, &name)?,
        Commands::Off => commands::off::run(&app)?,
        Commands::Available => commands::available::run(&app)?,
        Commands::Clean { target } => commands::clean::run(&app, target)?,
        Commands::Exec { with, command } => {
            exit_code = commands::exec::run(&app, &with, &command)?;
        }
        Commands::Clone { source, dest } => {
            commands::clone::run(&app, &source, &dest)?;
            bypass_orphan_check = true;
        }
        Commands::Config => commands::config::run(&app)?,
        Commands::Unconfig => commands::config::unconfig(&app)?,
    }

    if let Ok(catalog) = app.catalog() {
        strawbrew_core::Reconciler::new(&app.settings, &catalog)
            .shutdown_check(bypass_orphan_check);
    }

    Ok(exit_code)
}
