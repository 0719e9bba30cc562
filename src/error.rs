use ash::vk;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),
    #[error("no suitable physical device")]
    NoSuitableDevice,
    #[error("failed to create {kind:?}: {source}")]
    Create {
        kind: vk::ObjectType,
        source: vk::Result,
    },
    #[error("operation on a null {0:?} handle")]
    NullHandle(vk::ObjectType),
    #[error(transparent)]
    Vk(#[from] vk::Result),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// The native result code behind this error, if there is one.
    pub fn vk_result(&self) -> Option<vk::Result> {
        match self {
            Self::Create { source, .. } => Some(*source),
            Self::Vk(inner) => Some(*inner),
            _ => None,
        }
    }
}
