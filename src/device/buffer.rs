use super::*;

/// A buffer object with no memory bound to it.
#[derive(Debug, Default)]
pub struct BufferObject {
    buffer: Owned<vk::Buffer>,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
}

impl AsRef<vk::Buffer> for BufferObject {
    fn as_ref(&self) -> &vk::Buffer {
        self.buffer.as_ref()
    }
}

impl BufferObject {
    pub fn create(
        device: &DeviceWeakRef,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> Result<Self> {
        Ok(Self {
            buffer: Owned::create(device, (size, usage))?,
            size,
            usage,
        })
    }

    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    pub fn usage(&self) -> vk::BufferUsageFlags {
        self.usage
    }

    pub fn into_inner(self) -> Owned<vk::Buffer> {
        self.buffer
    }
}
