// Configuration management for the trustprobe CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/trustprobe/config.json
// - Linux: ~/.config/trustprobe/config.json
// - Windows: %APPDATA%\trustprobe\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trustprobe_core::ProbeConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe tunables shared with the mobile bindings
    pub probe: ProbeConfig,

    /// Print machine-readable JSON instead of the human summary
    pub output_json: bool,
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("trustprobe");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from `config_file`, creating a default file on first use
    pub fn load_from(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let contents =
                std::fs::read_to_string(config_file).context("Failed to read config file")?;
            let config: Config =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            config
                .probe
                .validate()
                .context("Invalid probe settings in config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_file)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_file: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_file, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Add an extra signature
    pub fn add_signature(&mut self, signature: &str) -> bool {
        let signature = signature.trim().to_lowercase();
        if signature.is_empty() || self.probe.extra_signatures.contains(&signature) {
            return false;
        }
        self.probe.extra_signatures.push(signature);
        true
    }

    /// Remove an extra signature
    pub fn remove_signature(&mut self, signature: &str) -> bool {
        let signature = signature.trim().to_lowercase();
        let before = self.probe.extra_signatures.len();
        self.probe.extra_signatures.retain(|s| *s != signature);
        before != self.probe.extra_signatures.len()
    }

    /// Set a config value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "use_builtin_signatures" => {
                self.probe.use_builtin_signatures =
                    value.parse().context("Invalid boolean value")?;
            }
            "extra_signatures" => {
                self.probe.extra_signatures = split_list(value);
            }
            "suspicious_paths" => {
                self.probe.suspicious_paths =
                    split_list(value).into_iter().map(PathBuf::from).collect();
            }
            "write_probe_path" => {
                self.probe.write_probe_path = PathBuf::from(value);
            }
            "deep_link" => {
                self.probe.deep_link = value.to_string();
            }
            "legacy_permission_api_cutoff" => {
                self.probe.legacy_permission_api_cutoff =
                    value.parse().context("Invalid API level")?;
            }
            "output_json" => {
                self.output_json = value.parse().context("Invalid boolean value")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        self.probe.validate().context("Rejected config value")?;
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "use_builtin_signatures" => Some(self.probe.use_builtin_signatures.to_string()),
            "extra_signatures" => Some(self.probe.extra_signatures.join(",")),
            "suspicious_paths" => Some(
                self.probe
                    .suspicious_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            "write_probe_path" => Some(self.probe.write_probe_path.display().to_string()),
            "deep_link" => Some(self.probe.deep_link.clone()),
            "legacy_permission_api_cutoff" => {
                Some(self.probe.legacy_permission_api_cutoff.to_string())
            }
            "output_json" => Some(self.output_json.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        [
            "use_builtin_signatures",
            "extra_signatures",
            "suspicious_paths",
            "write_probe_path",
            "deep_link",
            "legacy_permission_api_cutoff",
            "output_json",
        ]
        .iter()
        .map(|key| (key.to_string(), self.get(key).unwrap_or_default()))
        .collect()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
