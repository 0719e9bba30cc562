use super::*;

/// Orders batches of GPU work against each other. Binary, created
/// unsignalled.
#[derive(Debug, Default)]
pub struct Semaphore(Owned<vk::Semaphore>);

impl AsRef<vk::Semaphore> for Semaphore {
    fn as_ref(&self) -> &vk::Semaphore {
        self.0.as_ref()
    }
}

impl Semaphore {
    pub fn create(device: &DeviceWeakRef) -> Result<Self> {
        Ok(Self(Owned::create(device, ())?))
    }

    pub fn into_inner(self) -> Owned<vk::Semaphore> {
        self.0
    }
}
