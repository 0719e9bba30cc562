//! Owned wrappers for device-created Vulkan handles.
//!
//! Handles hold only a weak reference back to their [`device::Device`],
//! so the device can be torn down before its children without dangling
//! destroy calls.

pub mod config;
pub mod device;
pub mod driver;
pub mod error;

#[cfg(test)]
mod testing;

pub use config::DeviceConfig;
pub use device::{Device, DeviceRef, DeviceWeakRef, Owned};
pub use driver::{Driver, RecordingDriver, VulkanDriver};
pub use error::{Error, Result};
