//! The persistent-environment boundary.
//!
//! The engine never touches the OS environment store directly; it goes
//! through [`EnvStore`] so tests can substitute an in-memory double instead
//! of mutating real machine state.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;

/// Which environment table a PATH value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    User,
    Machine,
}

/// Get/set access to the persistent PATH variable.
pub trait EnvStore {
    /// Current PATH value for the scope, or `None` if unset.
    fn get(&self, scope: Scope) -> Option<String>;

    /// Persist the machine-scope PATH and broadcast the change so newly
    /// spawned processes observe it. Running shells are unaffected; users
    /// open a new shell to pick the value up.
    fn set_machine(&self, value: &str) -> Result<()>;
}

/// In-memory store used by tests and available to embedders.
#[derive(Debug, Default)]
pub struct MemoryEnvStore {
    values: Mutex<HashMap<Scope, String>>,
}

impl MemoryEnvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machine(value: &str) -> Self {
        let store = Self::new();
        store.seed(Scope::Machine, value);
        store
    }

    /// Directly set a scope's value, bypassing the `EnvStore` contract.
    pub fn seed(&self, scope: Scope, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(scope, value.to_string());
    }
}

impl EnvStore for MemoryEnvStore {
    fn get(&self, scope: Scope) -> Option<String> {
        self.values.lock().unwrap().get(&scope).cloned()
    }

    fn set_machine(&self, value: &str) -> Result<()> {
        self.seed(Scope::Machine, value);
        Ok(())
    }
}

/// Store backed by this process's own environment. Writes are process-local:
/// useful on hosts without a machine-wide store, and for dry runs.
#[derive(Debug, Default)]
pub struct ProcessEnvStore;

impl EnvStore for ProcessEnvStore {
    fn get(&self, _scope: Scope) -> Option<String> {
        std::env::var("PATH").ok()
    }

    fn set_machine(&self, value: &str) -> Result<()> {
        std::env::set_var("PATH", value);
        Ok(())
    }
}

/// The real machine store. Reads come from the registry-backed environment
/// tables; writes persist the machine PATH and broadcast `WM_SETTINGCHANGE`.
/// Both are delegated to the OS tooling so the engine holds no registry
/// access primitive of its own.
#[cfg(windows)]
#[derive(Debug, Default)]
pub struct SystemEnvStore;

#[cfg(windows)]
impl SystemEnvStore {
    fn query(key: &str) -> Option<String> {
        let output = std::process::Command::new("reg")
            .args(["query", key, "/v", "Path"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            // "    Path    REG_EXPAND_SZ    C:\Windows;..."
            if let Some(idx) = line.find("REG_") {
                let after = &line[idx..];
                let mut parts = after.splitn(2, char::is_whitespace);
                parts.next();
                if let Some(value) = parts.next() {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }
}

#[cfg(windows)]
impl EnvStore for SystemEnvStore {
    fn get(&self, scope: Scope) -> Option<String> {
        match scope {
            Scope::Machine => Self::query(
                r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment",
            ),
            Scope::User => Self::query(r"HKCU\Environment"),
        }
    }

    fn set_machine(&self, value: &str) -> Result<()> {
        use crate::error::Error;

        // SetEnvironmentVariable persists to the machine table and sends the
        // settings-change broadcast in one step.
        let script = format!(
            "[Environment]::SetEnvironmentVariable('Path', '{}', 'Machine')",
            value.replace('\'', "''")
        );
        let status = std::process::Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .status()
            .map_err(|e| Error::Io {
                message: "Failed to spawn powershell".into(),
                path: None,
                source: e,
            })?;

        if !status.success() {
            return Err(Error::PermissionDenied {
                message: "writing the machine PATH requires Administrator privilege".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_scopes_are_independent() {
        let store = MemoryEnvStore::new();
        store.seed(Scope::User, "C:\\user");
        store.set_machine("C:\\machine").unwrap();

        assert_eq!(store.get(Scope::User).as_deref(), Some("C:\\user"));
        assert_eq!(store.get(Scope::Machine).as_deref(), Some("C:\\machine"));
    }

    #[test]
    fn memory_store_unset_scope_is_none() {
        let store = MemoryEnvStore::new();
        assert_eq!(store.get(Scope::Machine), None);
    }
}
