//! strawbrew-core: the version-lifecycle and environment-switching engine.
//!
//! Everything stateful lives behind small seams: the persistent PATH behind
//! [`envstore::EnvStore`], the descriptor ledgers behind
//! [`registry::CustomRegistry`] and the embedded release list, the disk
//! behind plain paths derived from (install root, name). The design is
//! single-writer and fully synchronous: no locking, no rollback, no retry.
//! Concurrent invocations of the tool are out of contract.

pub mod catalog;
pub mod config;
pub mod envstore;
pub mod error;
pub mod exec;
pub mod install;
pub mod path;
pub mod reconcile;
pub mod registry;
pub mod resolver;

pub use catalog::{Catalog, DistRecord, PerlDist};
pub use config::{strawbrew_home, Settings};
pub use envstore::{EnvStore, MemoryEnvStore, ProcessEnvStore, Scope};
pub use error::{Error, Result};
pub use install::{is_installed, Installer};
pub use path::PathController;
pub use reconcile::Reconciler;
pub use registry::CustomRegistry;
pub use resolver::active_dist;

#[cfg(windows)]
pub use envstore::SystemEnvStore;
