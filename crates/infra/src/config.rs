//! Runtime configuration, read from the process environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `USE_PERSISTENT_STORES` | `false` | `true` selects SQLite, otherwise in-memory |
//! | `DATABASE_URL` | `sqlite://inventory.db?mode=rwc` | SQLite URL |
//! | `STOCKBOOK_REFERENCE_POLICY` | `advisory` | `advisory` or `enforced` |
//! | `STOCKBOOK_DB_MAX_CONNECTIONS` | `5` | SQLite pool size (in-memory URLs always use 1) |

use stockbook_core::{InventoryError, InventoryResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://inventory.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where inventory data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local maps; contents vanish on drop.
    InMemory,
    Sqlite { url: String },
}

/// How strictly movements must reference existing catalog entries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Dangling references are tolerated: movements may name unknown
    /// products or locations, and referenced entries may be removed.
    #[default]
    Advisory,
    /// Movements must name registered entries, and entries still referenced
    /// by a movement cannot be removed.
    Enforced,
}

impl ReferencePolicy {
    pub fn parse(raw: &str) -> InventoryResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "enforced" => Ok(Self::Enforced),
            other => Err(InventoryError::invalid(format!(
                "unknown reference policy '{other}' (expected 'advisory' or 'enforced')"
            ))),
        }
    }

    pub fn is_enforced(self) -> bool {
        matches!(self, Self::Enforced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub store: StoreBackend,
    pub reference_policy: ReferencePolicy,
    pub max_connections: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl InventoryConfig {
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::InMemory,
            reference_policy: ReferencePolicy::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn sqlite(url: impl Into<String>) -> Self {
        Self {
            store: StoreBackend::Sqlite { url: url.into() },
            ..Self::in_memory()
        }
    }

    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> InventoryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (unset keys return `None`).
    pub fn from_lookup<F>(lookup: F) -> InventoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                InventoryError::invalid(format!(
                    "USE_PERSISTENT_STORES must be 'true' or 'false' (got '{raw}')"
                ))
            })?,
        };

        let store = if use_persistent {
            let url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
            StoreBackend::Sqlite { url }
        } else {
            StoreBackend::InMemory
        };

        let reference_policy = lookup("STOCKBOOK_REFERENCE_POLICY")
            .map(|raw| ReferencePolicy::parse(&raw))
            .transpose()?
            .unwrap_or_default();

        let max_connections = match lookup("STOCKBOOK_DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(InventoryError::invalid(format!(
                        "STOCKBOOK_DB_MAX_CONNECTIONS must be a positive integer (got '{raw}')"
                    )));
                }
            },
        };

        Ok(Self {
            store,
            reference_policy,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> InventoryResult<InventoryConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InventoryConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_advisory() {
        let config = load(&[]).unwrap();
        assert_eq!(config, InventoryConfig::in_memory());
        assert_eq!(config.reference_policy, ReferencePolicy::Advisory);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn persistent_flag_selects_sqlite() {
        let config = load(&[("USE_PERSISTENT_STORES", "true")]).unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Sqlite {
                url: DEFAULT_DATABASE_URL.to_string()
            }
        );

        let config = load(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("STOCKBOOK_REFERENCE_POLICY", "Enforced"),
            ("STOCKBOOK_DB_MAX_CONNECTIONS", "2"),
        ])
        .unwrap();
        assert_eq!(
            config,
            InventoryConfig::sqlite("sqlite::memory:")
                .with_reference_policy(ReferencePolicy::Enforced)
                .with_max_connections(2)
        );
    }

    #[test]
    fn database_url_is_ignored_without_persistent_flag() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.store, StoreBackend::InMemory);
    }

    #[test]
    fn malformed_values_are_invalid_arguments() {
        for pairs in [
            vec![("USE_PERSISTENT_STORES", "yes")],
            vec![("STOCKBOOK_REFERENCE_POLICY", "strict")],
            vec![("STOCKBOOK_DB_MAX_CONNECTIONS", "0")],
            vec![("STOCKBOOK_DB_MAX_CONNECTIONS", "many")],
        ] {
            let err = load(&pairs).unwrap_err();
            assert!(matches!(err, InventoryError::InvalidArgument(_)), "{pairs:?}");
        }
    }
}
