// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./costlog.toml` > `~/.config/costlog/costlog.toml`, with
//! environment variable overrides via the `COSTLOG_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CostLogConfig;

/// Name of the local config file.
pub const CONFIG_FILE_NAME: &str = "costlog.toml";

/// Load configuration from the standard locations with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/costlog/costlog.toml` (user XDG config)
/// 3. `./costlog.toml` (local directory)
/// 4. `COSTLOG_*` environment variables
pub fn load_config() -> Result<CostLogConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CostLogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CostLogConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CostLogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CostLogConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CostLogConfig::default()))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Path of the per-user config file, if a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("costlog").join(CONFIG_FILE_NAME))
}

/// Environment provider mapping `COSTLOG_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `COSTLOG_LEDGER_COST_UPPERBOUND` must map to
/// `ledger.cost_upperbound`, not `ledger.cost.upperbound`.
fn env_provider() -> Env {
    Env::prefixed("COSTLOG_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("ledger_", "ledger.", 1)
            .replacen("pricing_", "pricing.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_ledger_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "costlog.toml",
                r#"
[ledger]
experiment_name = "from-file"
cost_upperbound = 5.0
"#,
            )?;
            jail.set_env("COSTLOG_LEDGER_COST_UPPERBOUND", "2.5");
            jail.set_env("COSTLOG_LOGGING_LEVEL", "debug");

            let config = load_config_from_path(Path::new("costlog.toml"))?;
            assert_eq!(config.ledger.experiment_name.as_deref(), Some("from-file"));
            assert_eq!(config.ledger.cost_upperbound, Some(2.5));
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
[ledger]
log_folder = "logs/costs"
"#,
            )?;
            let config = load_config()?;
            assert_eq!(config.ledger.log_folder, "logs/costs");
            Ok(())
        });
    }
}
