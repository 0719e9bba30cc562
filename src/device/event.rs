use super::*;

/// Fine-grained signal between commands on one queue, or between the host
/// and a queue. The host can set, reset and poll it but not wait on it.
#[derive(Debug, Default)]
pub struct Event(Owned<vk::Event>);

impl AsRef<vk::Event> for Event {
    fn as_ref(&self) -> &vk::Event {
        self.0.as_ref()
    }
}

impl Event {
    pub fn create(device: &DeviceWeakRef) -> Result<Self> {
        Ok(Self(Owned::create(device, ())?))
    }

    pub fn into_inner(self) -> Owned<vk::Event> {
        self.0
    }

    pub fn set(&self) -> Result<()> {
        let device = self.0.live_device()?;
        Ok(device.driver().set_event(self.0.raw())?)
    }

    pub fn reset(&self) -> Result<()> {
        let device = self.0.live_device()?;
        Ok(device.driver().reset_event(self.0.raw())?)
    }

    pub fn is_set(&self) -> Result<bool> {
        let device = self.0.live_device()?;
        Ok(device.driver().event_status(self.0.raw())?)
    }
}
