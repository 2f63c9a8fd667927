use anyhow::{Context, Result};
use std::path::PathBuf;

use strawbrew_core::{strawbrew_home, Catalog, CustomRegistry, EnvStore, PathController, Settings};

/// Everything a command needs, wired once at startup.
///
/// The catalog is deliberately NOT held here: descriptors are constructed
/// fresh on every load so commands that mutate the custom ledger see their
/// own writes on the next lookup.
pub struct App {
    pub settings: Settings,
    pub registry: CustomRegistry,
    store: Box<dyn EnvStore>,
}

impl App {
    pub fn bootstrap() -> Result<Self> {
        let home = strawbrew_home();
        let settings = Settings::load(&home).context("Failed to load strawbrew settings")?;
        settings.check_root_dir();

        let registry = CustomRegistry::new(home.join("custom.json"));
        registry
            .ensure_exists()
            .context("Failed to create the custom-install ledger")?;

        #[cfg(windows)]
        let store: Box<dyn EnvStore> = Box::new(strawbrew_core::SystemEnvStore);
        #[cfg(not(windows))]
        let store: Box<dyn EnvStore> = Box::new(strawbrew_core::ProcessEnvStore);

        Ok(Self {
            settings,
            registry,
            store,
        })
    }

    /// A freshly loaded catalog: built-ins plus the current custom ledger.
    pub fn catalog(&self) -> Result<Catalog> {
        let customs = self.registry.load()?;
        Catalog::load(&self.settings.root_dir, customs).context("Failed to load the version catalog")
    }

    pub fn store(&self) -> &dyn EnvStore {
        self.store.as_ref()
    }

    pub fn paths(&self) -> PathController<'_> {
        PathController::new(self.store.as_ref())
    }

    /// The directory holding the strawbrew binary itself.
    pub fn tool_bin_dir(&self) -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Failed to locate the strawbrew binary")?;
        Ok(exe
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")))
    }
}
