use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Longest name accepted for a catalog entry.
pub const MAX_NAME_LEN: usize = 25;

/// One record of a descriptor ledger, as stored on disk.
///
/// Field names match the shipped release ledger and the custom-install file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistRecord {
    pub name: String,
    pub file: String,
    pub url: String,
    pub ver: String,
    pub csum: String,
}

/// An installable Strawberry Perl build and its derived filesystem layout.
///
/// All paths are pure functions of (install root, name): the install
/// directory itself plus the three bin directories that go onto PATH.
#[derive(Debug, Clone, PartialEq)]
pub struct PerlDist {
    pub name: String,
    pub file: String,
    pub url: String,
    pub version: String,
    /// SHA-1 of the release archive, 40 lowercase hex chars.
    pub csum: String,
    pub custom: bool,
    pub install_path: PathBuf,
    pub c_bin: PathBuf,
    pub perl_bin: PathBuf,
    pub site_bin: PathBuf,
}

impl PerlDist {
    pub fn from_record(root: &Path, record: DistRecord, custom: bool) -> Self {
        let install_path = root.join(&record.name);
        Self {
            c_bin: install_path.join("c").join("bin"),
            perl_bin: install_path.join("perl").join("bin"),
            site_bin: install_path.join("perl").join("site").join("bin"),
            install_path,
            name: record.name,
            file: record.file,
            url: record.url,
            version: record.ver,
            csum: record.csum,
            custom,
        }
    }

    /// The three bin directories, in PATH precedence order.
    pub fn bin_paths(&self) -> [&Path; 3] {
        [&self.c_bin, &self.perl_bin, &self.site_bin]
    }

    /// Location of the interpreter binary inside this install.
    pub fn perl_exe(&self) -> PathBuf {
        self.perl_bin.join("perl.exe")
    }

    /// The ledger record describing this dist.
    pub fn record(&self) -> DistRecord {
        DistRecord {
            name: self.name.clone(),
            file: self.file.clone(),
            url: self.url.clone(),
            ver: self.version.clone(),
            csum: self.csum.clone(),
        }
    }
}

/// Reject names longer than [`MAX_NAME_LEN`] before anything else happens.
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            len: name.len(),
        });
    }
    Ok(())
}

/// The merged set of all known dists: built-ins first, customs after.
///
/// Insertion-ordered; inserting a name that already exists fails fast with
/// [`Error::DuplicateName`] rather than overwriting.
#[derive(Debug, Default)]
pub struct Catalog {
    dists: Vec<PerlDist>,
}

const BUILTIN_RELEASES: &str = include_str!("../data/releases.json");

impl Catalog {
    /// Build the catalog from the shipped release ledger plus the records
    /// persisted by the custom-install registry.
    pub fn load(root: &Path, custom_records: Vec<DistRecord>) -> Result<Self> {
        let builtin: Vec<DistRecord> =
            serde_json::from_str(BUILTIN_RELEASES).map_err(|e| Error::ConfigMalformed {
                path: PathBuf::from("releases.json"),
                detail: e.to_string(),
            })?;

        let mut catalog = Catalog::default();
        for record in builtin {
            catalog.insert(PerlDist::from_record(root, record, false))?;
        }
        for record in custom_records {
            catalog.insert(PerlDist::from_record(root, record, true))?;
        }
        Ok(catalog)
    }

    /// Insert a dist, rejecting duplicate names.
    pub fn insert(&mut self, dist: PerlDist) -> Result<()> {
        validate_name(&dist.name)?;
        if self.dists.iter().any(|d| d.name == dist.name) {
            return Err(Error::DuplicateName { name: dist.name });
        }
        self.dists.push(dist);
        Ok(())
    }

    /// Look a dist up by name.
    pub fn resolve(&self, name: &str) -> Result<&PerlDist> {
        self.dists
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerlDist> {
        self.dists.iter()
    }

    pub fn len(&self) -> usize {
        self.dists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dists.is_empty()
    }

    /// Dists whose install actually exists on disk.
    pub fn installed(&self) -> Vec<&PerlDist> {
        self.dists
            .iter()
            .filter(|d| crate::install::is_installed(d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DistRecord {
        DistRecord {
            name: name.to_string(),
            file: format!("strawberry-perl-{name}-portable.zip"),
            url: format!("https://strawberryperl.com/download/{name}.zip"),
            ver: "5.32.1".to_string(),
            csum: "0123456789abcdef0123456789abcdef01234567".to_string(),
        }
    }

    #[test]
    fn derived_paths_are_functions_of_root_and_name() {
        let root = Path::new("C:\\strawbrew\\perls");
        let dist = PerlDist::from_record(root, record("5.32.1_64"), false);

        assert_eq!(dist.install_path, root.join("5.32.1_64"));
        assert_eq!(dist.c_bin, root.join("5.32.1_64").join("c").join("bin"));
        assert_eq!(dist.perl_bin, root.join("5.32.1_64").join("perl").join("bin"));
        assert_eq!(
            dist.site_bin,
            root.join("5.32.1_64").join("perl").join("site").join("bin")
        );
    }

    #[test]
    fn no_two_dists_share_a_derived_path() {
        let root = Path::new("/tmp/perls");
        let catalog = Catalog::load(root, vec![record("my-custom")]).unwrap();

        let mut seen = std::collections::HashSet::new();
        for dist in catalog.iter() {
            for path in dist.bin_paths() {
                assert!(seen.insert(path.to_path_buf()), "path collision: {path:?}");
            }
            assert!(seen.insert(dist.install_path.clone()));
        }
    }

    #[test]
    fn resolve_roundtrip_and_not_found() {
        let root = Path::new("/tmp/perls");
        let catalog = Catalog::load(root, vec![]).unwrap();

        for dist in catalog.iter() {
            assert_eq!(catalog.resolve(&dist.name).unwrap().name, dist.name);
        }
        assert!(matches!(
            catalog.resolve("5.8.8_32"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn custom_name_collision_aborts_load() {
        let root = Path::new("/tmp/perls");
        let builtin: Vec<DistRecord> = serde_json::from_str(BUILTIN_RELEASES).unwrap();
        let clash = builtin[0].name.clone();

        let err = Catalog::load(root, vec![record(&clash)]).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { name } if name == clash));
    }

    #[test]
    fn builtins_precede_customs_in_iteration_order() {
        let root = Path::new("/tmp/perls");
        let catalog = Catalog::load(root, vec![record("my-custom")]).unwrap();

        let customs: Vec<bool> = catalog.iter().map(|d| d.custom).collect();
        let first_custom = customs.iter().position(|c| *c).unwrap();
        assert!(customs[..first_custom].iter().all(|c| !*c));
        assert!(customs[first_custom..].iter().all(|c| *c));
    }

    #[test]
    fn name_length_is_enforced_at_insert() {
        let root = Path::new("/tmp/perls");
        let mut catalog = Catalog::load(root, vec![]).unwrap();
        let long = "a".repeat(26);

        let err = catalog.insert(PerlDist::from_record(root, record(&long), true));
        assert!(matches!(err, Err(Error::NameTooLong { len: 26, .. })));
    }
}
