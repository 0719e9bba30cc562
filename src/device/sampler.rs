use super::*;
use crate::driver::SamplerInfo;

#[derive(Debug, Default)]
pub struct Sampler(Owned<vk::Sampler>);

impl AsRef<vk::Sampler> for Sampler {
    fn as_ref(&self) -> &vk::Sampler {
        self.0.as_ref()
    }
}

impl Sampler {
    pub fn create(device: &DeviceWeakRef, info: SamplerInfo) -> Result<Self> {
        Ok(Self(Owned::create(device, info)?))
    }

    pub fn nearest(device: &DeviceWeakRef) -> Result<Self> {
        Self::create(device, SamplerInfo::default())
    }

    pub fn linear(device: &DeviceWeakRef) -> Result<Self> {
        Self::create(
            device,
            SamplerInfo {
                filter: vk::Filter::LINEAR,
                ..SamplerInfo::default()
            },
        )
    }

    pub fn into_inner(self) -> Owned<vk::Sampler> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CreateParams, RecordingDriver};

    #[test]
    fn filter_constructors_reach_the_driver() {
        let driver = RecordingDriver::new();
        let journal = driver.journal();
        let device = Device::new(driver);
        let weak = Rc::downgrade(&device);
        let linear = Sampler::linear(&weak).unwrap();
        let nearest = Sampler::nearest(&weak).unwrap();
        assert_eq!(
            journal.create_params(vk::Handle::as_raw(linear.0.raw())),
            Some(CreateParams::Sampler(SamplerInfo {
                filter: vk::Filter::LINEAR,
                address_mode: vk::SamplerAddressMode::REPEAT,
            }))
        );
        assert_eq!(
            journal.create_params(vk::Handle::as_raw(nearest.0.raw())),
            Some(CreateParams::Sampler(SamplerInfo {
                filter: vk::Filter::NEAREST,
                address_mode: vk::SamplerAddressMode::REPEAT,
            }))
        );
    }
}
