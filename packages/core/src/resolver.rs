//! Determines which catalog entry, if any, currently occupies PATH.

use crate::catalog::{Catalog, PerlDist};
use crate::envstore::{EnvStore, Scope};
use crate::path::PATH_SEPARATOR;

/// Scan the machine PATH for each dist's bin directories, in catalog order.
///
/// A hit ends the scan for that dist but NOT the scan over the catalog, so
/// when more than one dist's paths are simultaneously present (an
/// inconsistent but possible state) the last matching dist in catalog order
/// wins. That tie-break is deliberate and pinned by tests; don't "fix" it.
pub fn active_dist<'a>(catalog: &'a Catalog, store: &dyn EnvStore) -> Option<&'a PerlDist> {
    let path = store.get(Scope::Machine)?;
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();

    let mut current = None;
    for dist in catalog.iter() {
        let bins: Vec<String> = dist
            .bin_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        for seg in &segments {
            if bins.iter().any(|b| b == seg) {
                current = Some(dist);
                break;
            }
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envstore::MemoryEnvStore;
    use std::path::Path;

    fn catalog() -> Catalog {
        Catalog::load(Path::new("C:\\strawbrew\\perls"), vec![]).unwrap()
    }

    #[test]
    fn none_when_no_dist_on_path() {
        let catalog = catalog();
        let store = MemoryEnvStore::with_machine("C:\\Windows;C:\\tools");
        assert!(active_dist(&catalog, &store).is_none());
    }

    #[test]
    fn none_when_path_unset() {
        let catalog = catalog();
        let store = MemoryEnvStore::new();
        assert!(active_dist(&catalog, &store).is_none());
    }

    #[test]
    fn finds_the_dist_whose_bin_dirs_are_present() {
        let catalog = catalog();
        let dist = catalog.resolve("5.30.3_64").unwrap();
        let path = format!(
            "{};{};{};C:\\Windows",
            dist.c_bin.display(),
            dist.perl_bin.display(),
            dist.site_bin.display()
        );
        let store = MemoryEnvStore::with_machine(&path);

        assert_eq!(active_dist(&catalog, &store).unwrap().name, "5.30.3_64");
    }

    #[test]
    fn a_single_bin_dir_is_enough() {
        let catalog = catalog();
        let dist = catalog.resolve("5.28.2_64").unwrap();
        let path = format!("C:\\Windows;{}", dist.site_bin.display());
        let store = MemoryEnvStore::with_machine(&path);

        assert_eq!(active_dist(&catalog, &store).unwrap().name, "5.28.2_64");
    }

    #[test]
    fn last_catalog_match_wins_when_two_dists_are_present() {
        let catalog = catalog();
        let earlier = catalog.resolve("5.32.1_64").unwrap();
        let later = catalog.resolve("5.30.3_64").unwrap();

        // PATH order is the reverse of catalog order; catalog order decides.
        let path = format!(
            "{};{};C:\\Windows",
            later.perl_bin.display(),
            earlier.perl_bin.display()
        );
        let store = MemoryEnvStore::with_machine(&path);

        assert_eq!(active_dist(&catalog, &store).unwrap().name, later.name);
    }
}
