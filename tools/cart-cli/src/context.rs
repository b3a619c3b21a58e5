//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{CliConfig, DEFAULT_STORE_PATH};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Resolved store file location.
    pub store_path: PathBuf,
}

impl Context {
    /// Load context from config file and flags.
    ///
    /// The store path comes from `--store` / `CART_STORE_PATH`, then the
    /// config file, then [`DEFAULT_STORE_PATH`].
    pub fn load(
        config_path: Option<&Path>,
        store: Option<PathBuf>,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        let store_path = store
            .or_else(|| config.store.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
        let store_path = resolve_path(&cwd, &store_path);
        tracing::debug!(
            path = %store_path.display(),
            key = %config.cart.storage_key,
            "using cart store"
        );

        Ok(Self {
            config,
            output,
            store_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let config_names = ["cart.toml", ".cart.toml", "cart.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(&config_path) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }
}

/// Resolve a path relative to the working directory.
fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
