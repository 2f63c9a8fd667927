//! The install pipeline: probe, fetch, verify, extract, clone, remove.
//!
//! Nothing here is atomic. A failed extract or copy leaves whatever was
//! already written; failures are surfaced per item and the operation keeps
//! going with the rest.

use indicatif::{ProgressBar, ProgressStyle};
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::catalog::{validate_name, Catalog, PerlDist};
use crate::config::Settings;
use crate::envstore::EnvStore;
use crate::error::{Error, Result};
use crate::path::PathController;
use crate::registry::CustomRegistry;
use crate::resolver::active_dist;

/// True iff the install root exists AND the interpreter binary is present.
/// A pure filesystem probe, re-evaluated on every call.
pub fn is_installed(dist: &PerlDist) -> bool {
    dist.install_path.exists() && dist.perl_exe().exists()
}

pub struct Installer<'a> {
    settings: &'a Settings,
    client: reqwest::blocking::Client,
}

impl<'a> Installer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("strawbrew/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to build HTTP client");

        Self { settings, client }
    }

    /// Where `dist`'s archive belongs. Ensures the cache directory exists,
    /// falling back to a fresh directory under the OS temp dir when the
    /// configured one can't be created.
    pub fn archive_path(&self, dist: &PerlDist) -> Result<PathBuf> {
        let cache = &self.settings.temp_dir;
        match fs::create_dir_all(cache) {
            Ok(()) => Ok(cache.join(&dist.file)),
            Err(e) => {
                eprintln!(
                    "Error, do not have permissions to create directory: {}",
                    cache.display()
                );
                debug!(error = %e, "archive cache creation failed, using a temp dir");
                println!("Creating temporary directory instead");
                Ok(fallback_cache_dir()?.join(&dist.file))
            }
        }
    }

    /// Make `dist`'s archive present and verified in the cache.
    ///
    /// The download is skipped when a file with the expected archive name is
    /// already cached. Either way the SHA-1 digest must equal the
    /// descriptor's checksum before anything is extracted; a mismatch is
    /// terminal for the command and the corrupt file is left in place for
    /// the caller to deal with.
    pub fn fetch(&self, dist: &PerlDist) -> Result<PathBuf> {
        let archive = self.archive_path(dist)?;

        if !archive.exists() {
            println!("Downloading {} to {}", dist.url, archive.display());
            self.download(&dist.url, &archive)?;
        }

        println!("Confirming checksum ...");
        let actual = sha1_hex(&archive)?;
        if actual != dist.csum {
            return Err(Error::ChecksumMismatch {
                archive,
                expected: dist.csum.clone(),
                actual,
            });
        }
        Ok(archive)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Download {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                detail: format!("HTTP {}", response.status()),
            });
        }

        let total = response.content_length().unwrap_or(0);
        let pb = if total > 0 {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{bar:40.green} {bytes}/{total_bytes} {msg}")
                    .unwrap(),
            );
            pb
        } else {
            ProgressBar::new_spinner()
        };

        // Download to a temp file first so an interrupted transfer never
        // masquerades as a cached archive.
        let tmp = dest.with_extension("tmp");
        let mut file = File::create(&tmp)
            .map_err(|e| Error::io("Failed to create download file", &tmp, e))?;

        let mut reader = pb.wrap_read(response);
        io::copy(&mut reader, &mut file)
            .map_err(|e| Error::io("Download interrupted", &tmp, e))?;
        pb.finish_and_clear();

        fs::rename(&tmp, dest).map_err(|e| Error::io("Failed to finalize download", dest, e))
    }

    /// Unpack every archive entry into the install root, overwriting what's
    /// there. Best-effort: an entry that fails is logged and skipped,
    /// nothing already written is rolled back.
    pub fn extract(&self, dist: &PerlDist, archive: &Path) -> Result<()> {
        println!("Extracting {}", archive.display());
        debug!(
            archive = %archive.display(),
            dest = %dist.install_path.display(),
            "extracting"
        );

        let file = File::open(archive)
            .map_err(|e| Error::io("Failed to open archive", archive, e))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| Error::Io {
            message: "Failed to read zip archive".into(),
            path: Some(archive.to_path_buf()),
            source: e.into(),
        })?;

        for i in 0..zip.len() {
            let mut entry = match zip.by_index(i) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(index = i, error = %e, "skipping unreadable archive entry");
                    continue;
                }
            };

            let out = dist.install_path.join(entry.name());
            let result = if entry.is_dir() {
                fs::create_dir_all(&out)
            } else {
                out.parent()
                    .map(fs::create_dir_all)
                    .unwrap_or(Ok(()))
                    .and_then(|_| File::create(&out))
                    .and_then(|mut f| io::copy(&mut entry, &mut f).map(|_| ()))
            };

            if let Err(e) = result {
                warn!(entry = entry.name(), error = %e, "failed to extract entry");
                eprintln!(
                    "Failed to extract {} to {}",
                    entry.name(),
                    dist.install_path.display()
                );
            }
        }
        Ok(())
    }

    /// Copy an existing install to a new name and register it as a custom
    /// dist inheriting the source's archive metadata (so the stored checksum
    /// describes the source archive, not the cloned tree).
    ///
    /// The copy is an additive merge: conflicts are overwritten, files
    /// already present only at the destination are left alone.
    pub fn clone_dist(
        &self,
        catalog: &Catalog,
        registry: &CustomRegistry,
        source_name: &str,
        dest_name: &str,
    ) -> Result<()> {
        // Everything that can be checked without touching the filesystem
        // happens first.
        validate_name(dest_name)?;
        if catalog.resolve(dest_name).is_ok() {
            return Err(Error::DuplicateName {
                name: dest_name.to_string(),
            });
        }

        let source = catalog.resolve(source_name)?;
        if !source.install_path.exists() {
            return Err(Error::NotFound {
                name: source_name.to_string(),
            });
        }

        let dest_root = self.settings.root_dir.join(dest_name);
        fs::create_dir_all(&dest_root)
            .map_err(|e| Error::io("Failed to create clone destination", &dest_root, e))?;

        let mut failed = 0usize;
        for entry in WalkDir::new(&source.install_path).into_iter().flatten() {
            let rel = match entry.path().strip_prefix(&source.install_path) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let target = dest_root.join(rel);

            let result = if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
            } else {
                fs::copy(entry.path(), &target).map(|_| ())
            };

            if let Err(e) = result {
                warn!(path = %entry.path().display(), error = %e, "clone copy failed");
                failed += 1;
            }
        }

        if failed > 0 {
            eprintln!("Clone finished with {failed} file(s) skipped due to I/O errors");
        }

        let mut record = source.record();
        record.name = dest_name.to_string();
        registry.add(record)
    }

    /// Delete an installed dist: clear its PATH entries if it is the active
    /// one, remove its tree, and drop its ledger record if it is custom.
    /// Returns whether the removed dist was a custom one.
    pub fn remove(
        &self,
        catalog: &Catalog,
        store: &dyn EnvStore,
        registry: &CustomRegistry,
        name: &str,
    ) -> Result<bool> {
        let dist = catalog.resolve(name)?;

        let is_active = active_dist(catalog, store)
            .map(|active| active.name == dist.name)
            .unwrap_or(false);
        if is_active {
            println!("Removing {} from PATH", dist.name);
            PathController::new(store).remove_dists(catalog, true)?;
        }

        if !dist.install_path.exists() {
            return Err(Error::NotFound {
                name: name.to_string(),
            });
        }

        reset_attributes(&dist.install_path);
        if let Err(e) = fs::remove_dir_all(&dist.install_path) {
            warn!(path = %dist.install_path.display(), error = %e, "incomplete removal");
            eprintln!(
                "Unable to completely remove {} some files may remain",
                dist.name
            );
        }

        if dist.custom {
            registry.remove(name)?;
        }
        Ok(dist.custom)
    }
}

/// SHA-1 digest of a file as lowercase hex.
pub fn sha1_hex(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).map_err(|e| Error::io("Failed to open file for hashing", path, e))?;
    let mut hasher = Sha1::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| Error::io("Failed to hash file", path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Recursively clear read-only attributes under `dir` so deletion can
/// proceed. Failures here only matter if the delete itself then fails.
pub(crate) fn reset_attributes(dir: &Path) {
    for entry in WalkDir::new(dir).into_iter().flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        let mut perms = metadata.permissions();
        if perms.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            if let Err(e) = fs::set_permissions(entry.path(), perms) {
                debug!(path = %entry.path().display(), error = %e, "could not reset attributes");
            }
        }
    }
}

/// A cache directory of last resort under the OS temp dir.
fn fallback_cache_dir() -> Result<PathBuf> {
    let base = std::env::temp_dir();
    let mut n = std::process::id();
    loop {
        let candidate = base.join(format!("strawbrew-cache-{n}"));
        if !candidate.exists() {
            fs::create_dir_all(&candidate)
                .map_err(|e| Error::io("Failed to create temp cache dir", &candidate, e))?;
            return Ok(candidate);
        }
        n = n.wrapping_add(1);
    }
}
