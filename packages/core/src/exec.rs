//! Run a command against each installed dist in turn.
//!
//! Each child process gets its own PATH: the dist's three bin directories
//! first, then the system PATH with every dist's entries stripped out, so
//! the target version's binaries always win.

use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

use crate::catalog::{Catalog, PerlDist};
use crate::config::Settings;
use crate::envstore::EnvStore;
use crate::error::{Error, Result};
use crate::path::{PathController, PATH_SEPARATOR};

/// The installed dists a command should run against.
///
/// `with` narrows the set to the named dists. Custom dists are skipped
/// unless `custom_exec` is configured, and template installs (names
/// containing `tmpl` or `template`) are never run against.
pub fn targets<'a>(
    catalog: &'a Catalog,
    settings: &Settings,
    with: &[String],
) -> Vec<&'a PerlDist> {
    catalog
        .installed()
        .into_iter()
        .filter(|d| with.is_empty() || with.iter().any(|n| *n == d.name))
        .filter(|d| !d.custom || settings.custom_exec)
        .filter(|d| !d.name.contains("tmpl") && !d.name.contains("template"))
        .collect()
}

/// PATH value for a child running under `dist`.
pub fn child_path(dist: &PerlDist, sys_path: &str) -> String {
    let mut segments: Vec<String> = dist
        .bin_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    if !sys_path.is_empty() {
        segments.push(sys_path.to_string());
    }
    segments.join(&PATH_SEPARATOR.to_string())
}

/// Run `command` against every target dist, blocking on each in turn.
/// Returns the worst exit code seen (0 when everything succeeded).
pub fn run(
    catalog: &Catalog,
    settings: &Settings,
    store: &dyn EnvStore,
    with: &[String],
    command: &[String],
) -> Result<i32> {
    if command.is_empty() {
        return Ok(0);
    }
    let sys_path = PathController::new(store).remove_dists(catalog, false)?;

    let mut worst = 0;
    for dist in targets(catalog, settings, with) {
        println!("Perl-{}\n==============", dist.name);
        match run_one(dist, &sys_path, command) {
            Ok(code) => {
                if code != 0 {
                    debug!(dist = %dist.name, code, "command failed");
                }
                worst = worst.max(code);
            }
            // One dist failing to spawn doesn't stop the rest.
            Err(e) => {
                warn!(dist = %dist.name, error = %e, "could not run command");
                eprintln!("{e}");
                worst = worst.max(1);
            }
        }
    }
    Ok(worst)
}

fn run_one(dist: &PerlDist, sys_path: &str, command: &[String]) -> Result<i32> {
    // The invoked binary is resolved against the dist's own bin directory,
    // not the inherited PATH.
    let program = dist.perl_bin.join(&command[0]);

    let mut child = shell_command(&program, &command[1..]);
    child.env("PATH", child_path(dist, sys_path));

    let status = child.status().map_err(|e| Error::Io {
        message: format!("Failed to run '{}'", command.join(" ")),
        path: Some(program.clone()),
        source: e,
    })?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(windows)]
fn shell_command(program: &Path, args: &[String]) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/c").arg(program).args(args);
    cmd
}

#[cfg(not(windows))]
fn shell_command(program: &Path, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}
