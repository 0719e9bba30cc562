use super::*;

#[derive(Debug, Default)]
pub struct CommandPool(Owned<vk::CommandPool>);

impl AsRef<vk::CommandPool> for CommandPool {
    fn as_ref(&self) -> &vk::CommandPool {
        self.0.as_ref()
    }
}

impl CommandPool {
    pub fn create(device: &DeviceWeakRef, flags: vk::CommandPoolCreateFlags) -> Result<Self> {
        Ok(Self(Owned::create(device, flags)?))
    }

    /// A pool for short-lived command buffers.
    pub fn transient(device: &DeviceWeakRef) -> Result<Self> {
        Self::create(device, vk::CommandPoolCreateFlags::TRANSIENT)
    }

    pub fn into_inner(self) -> Owned<vk::CommandPool> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CreateParams, RecordingDriver};

    #[test]
    fn transient_pool_passes_its_flag() {
        let driver = RecordingDriver::new();
        let journal = driver.journal();
        let device = Device::new(driver);
        let pool = CommandPool::transient(&Rc::downgrade(&device)).unwrap();
        let raw = vk::Handle::as_raw(pool.0.raw());
        assert_eq!(
            journal.create_params(raw),
            Some(CreateParams::CommandPool {
                flags: vk::CommandPoolCreateFlags::TRANSIENT,
            })
        );
        drop(pool);
        assert_eq!(journal.destroys(), vec![(vk::ObjectType::COMMAND_POOL, raw)]);
    }
}
