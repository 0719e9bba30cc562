//! The native entry points a [`Device`](crate::device::Device) drives.

use ash::prelude::VkResult;
use ash::vk;

pub use recording::{Call, Journal, RecordingDriver};
pub use vulkan::VulkanDriver;

mod recording;
mod vulkan;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SamplerInfo {
    pub filter: vk::Filter,
    pub address_mode: vk::SamplerAddressMode,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        Self {
            filter: vk::Filter::NEAREST,
            address_mode: vk::SamplerAddressMode::REPEAT,
        }
    }
}

/// Everything a driver needs to create one handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CreateParams {
    Semaphore,
    Fence {
        signalled: bool,
    },
    Event,
    Sampler(SamplerInfo),
    Buffer {
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    },
    CommandPool {
        flags: vk::CommandPoolCreateFlags,
    },
}

impl CreateParams {
    pub fn kind(&self) -> vk::ObjectType {
        match self {
            Self::Semaphore => vk::ObjectType::SEMAPHORE,
            Self::Fence { .. } => vk::ObjectType::FENCE,
            Self::Event => vk::ObjectType::EVENT,
            Self::Sampler(_) => vk::ObjectType::SAMPLER,
            Self::Buffer { .. } => vk::ObjectType::BUFFER,
            Self::CommandPool { .. } => vk::ObjectType::COMMAND_POOL,
        }
    }
}

/// Handle creation and destruction for one open device.
///
/// Raw handles cross this boundary as `u64` (`vk::Handle::as_raw`), tagged
/// with their `vk::ObjectType`. A driver must never hand out the null
/// value, and must not reuse a value while the handle holding it is live.
///
/// Implementations are not expected to be thread safe; the owning
/// [`Device`](crate::device::Device) is `!Send`.
pub trait Driver {
    fn name(&self) -> &str;

    fn create_handle(&self, params: &CreateParams) -> VkResult<u64>;

    /// # Safety
    ///
    /// `raw` must have been returned by `create_handle` on this driver with
    /// the same `kind`, and must not have been destroyed since. The caller
    /// gives up the handle: nothing may use or destroy it afterwards.
    unsafe fn destroy_handle(&self, kind: vk::ObjectType, raw: u64) -> VkResult<()>;

    fn wait_for_fences(&self, fences: &[vk::Fence], wait_all: bool, timeout: u64)
        -> VkResult<()>;

    fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()>;

    fn fence_status(&self, fence: vk::Fence) -> VkResult<bool>;

    fn set_event(&self, event: vk::Event) -> VkResult<()>;

    fn reset_event(&self, event: vk::Event) -> VkResult<()>;

    fn event_status(&self, event: vk::Event) -> VkResult<bool>;

    fn wait_idle(&self) -> VkResult<()>;
}
