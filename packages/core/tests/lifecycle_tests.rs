//! End-to-end lifecycle: seed an archive in the cache, fetch (no network),
//! extract, switch, resolve, switch off, remove.

use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

use strawbrew_core::{
    active_dist, is_installed, Catalog, CustomRegistry, DistRecord, EnvStore, Installer,
    MemoryEnvStore, PathController, PerlDist, Scope, Settings,
};

struct Harness {
    _dir: TempDir,
    settings: Settings,
    registry: CustomRegistry,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            root_dir: dir.path().join("perls"),
            temp_dir: dir.path().join("temp"),
            download_url: "https://strawberryperl.com/download".to_string(),
            custom_exec: false,
        };
        fs::create_dir_all(&settings.root_dir).unwrap();
        fs::create_dir_all(&settings.temp_dir).unwrap();
        let registry = CustomRegistry::new(dir.path().join("custom.json"));
        registry.ensure_exists().unwrap();
        Self {
            _dir: dir,
            settings,
            registry,
        }
    }

    fn catalog(&self) -> Catalog {
        Catalog::load(&self.settings.root_dir, self.registry.load().unwrap()).unwrap()
    }

    /// Build a portable-archive zip holding a minimal Strawberry layout and
    /// seed it into the archive cache under `file`, returning its SHA-1.
    fn seed_archive(&self, file: &str) -> String {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            for dir in ["c/bin/", "perl/bin/", "perl/site/bin/"] {
                writer.add_directory(dir.trim_end_matches('/'), options).unwrap();
            }
            writer.start_file("perl/bin/perl.exe", options).unwrap();
            writer.write_all(b"#!perl").unwrap();
            writer.start_file("c/bin/gcc.exe", options).unwrap();
            writer.write_all(b"#!gcc").unwrap();
            writer.finish().unwrap();
        }
        let bytes = cursor.into_inner();
        fs::write(self.settings.temp_dir.join(file), &bytes).unwrap();

        let mut hasher = Sha1::new();
        hasher.update(&bytes);
        hex::encode(hasher.finalize())
    }

    /// A catalog whose named entry points at the seeded archive.
    fn catalog_with_seeded(&self, name: &str) -> Catalog {
        let file = format!("{name}.zip");
        let csum = self.seed_archive(&file);
        let mut catalog = self.catalog();
        catalog
            .insert(PerlDist::from_record(
                &self.settings.root_dir,
                DistRecord {
                    name: name.to_string(),
                    file,
                    url: "https://invalid.invalid/never-fetched.zip".to_string(),
                    ver: "5.32.1".to_string(),
                    csum,
                },
                false,
            ))
            .unwrap();
        catalog
    }
}

#[test]
fn install_switch_resolve_off() {
    let harness = Harness::new();
    let catalog = harness.catalog_with_seeded("seeded_64");
    let dist = catalog.resolve("seeded_64").unwrap();
    let installer = Installer::new(&harness.settings);

    assert!(!is_installed(dist));

    // Fetch finds the cached archive, verifies it, and never goes near the
    // (unresolvable) URL. Then extraction produces a complete install.
    let archive = installer.fetch(dist).unwrap();
    installer.extract(dist, &archive).unwrap();
    assert!(is_installed(dist));

    // Switch: scrub every dist from PATH, then put this one's bins first.
    let store = MemoryEnvStore::with_machine("C:\\Windows;C:\\Windows\\system32");
    let paths = PathController::new(&store);
    paths.remove_dists(&catalog, true).unwrap();
    paths.add_dist(dist).unwrap();

    let value = store.get(Scope::Machine).unwrap();
    assert!(value.starts_with(&dist.c_bin.display().to_string()));
    assert_eq!(active_dist(&catalog, &store).unwrap().name, "seeded_64");

    // Off: all dist segments gone, the rest intact, no active version.
    paths.remove_dists(&catalog, true).unwrap();
    assert!(active_dist(&catalog, &store).is_none());
    assert_eq!(
        store.get(Scope::Machine).as_deref(),
        Some("C:\\Windows;C:\\Windows\\system32")
    );
}

#[test]
fn checksum_mismatch_is_terminal_before_extraction() {
    let harness = Harness::new();
    let mut catalog = harness.catalog();
    harness.seed_archive("tampered_64.zip");
    catalog
        .insert(PerlDist::from_record(
            &harness.settings.root_dir,
            DistRecord {
                name: "tampered_64".to_string(),
                file: "tampered_64.zip".to_string(),
                url: "https://invalid.invalid/tampered.zip".to_string(),
                ver: "5.32.1".to_string(),
                // Deliberately not the digest of the seeded bytes.
                csum: "ffffffffffffffffffffffffffffffffffffffff".to_string(),
            },
            false,
        ))
        .unwrap();

    let dist = catalog.resolve("tampered_64").unwrap();
    let installer = Installer::new(&harness.settings);

    let err = installer.fetch(dist).unwrap_err();
    assert!(matches!(
        err,
        strawbrew_core::Error::ChecksumMismatch { .. }
    ));
    // Extraction never ran: the install root was never created.
    assert!(!dist.install_path.exists());
    assert!(!is_installed(dist));
}

#[test]
fn clone_then_remove_keeps_ledger_and_disk_in_step() {
    let harness = Harness::new();
    let catalog = harness.catalog_with_seeded("seeded_64");
    let dist = catalog.resolve("seeded_64").unwrap();
    let installer = Installer::new(&harness.settings);

    let archive = installer.fetch(dist).unwrap();
    installer.extract(dist, &archive).unwrap();

    installer
        .clone_dist(&catalog, &harness.registry, "seeded_64", "work")
        .unwrap();
    assert_eq!(harness.registry.load().unwrap().len(), 1);

    // A reloaded catalog picks the clone up as a custom, installed dist.
    let catalog = harness.catalog();
    let clone = catalog.resolve("work").unwrap();
    assert!(clone.custom);
    assert!(is_installed(clone));

    let store = MemoryEnvStore::new();
    let was_custom = installer
        .remove(&catalog, &store, &harness.registry, "work")
        .unwrap();
    assert!(was_custom);
    assert!(harness.registry.load().unwrap().is_empty());
    assert!(!harness.settings.root_dir.join("work").exists());
}

#[test]
fn reloaded_catalog_rejects_a_custom_name_shadowing_a_builtin() {
    let harness = Harness::new();
    harness
        .registry
        .add(DistRecord {
            name: "5.32.1_64".to_string(),
            file: "x.zip".to_string(),
            url: "https://strawberryperl.com/x.zip".to_string(),
            ver: "5.32.1".to_string(),
            csum: "8825a9d3a545d5c58b4f9eb373ecbc431e03e444".to_string(),
        })
        .unwrap();

    let err = Catalog::load(
        &harness.settings.root_dir,
        harness.registry.load().unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, strawbrew_core::Error::DuplicateName { .. }));
}
