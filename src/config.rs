use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Settings for opening a [`VulkanDriver`](crate::driver::VulkanDriver).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub application_name: String,
    /// Enables `VK_LAYER_KHRONOS_validation` and the debug-utils messenger
    /// when the layer is installed.
    pub validation: bool,
    /// Index into the enumerated physical devices. Overrides
    /// `prefer_discrete` when set.
    pub device_index: Option<usize>,
    pub prefer_discrete: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            application_name: String::from("vk-owned"),
            validation: cfg!(debug_assertions),
            device_index: None,
            prefer_discrete: true,
        }
    }
}

impl DeviceConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }
}
