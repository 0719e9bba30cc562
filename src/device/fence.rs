use std::convert::TryFrom;
use std::time::Duration;

use super::*;

/// Waits forever.
pub const NO_TIMEOUT: u64 = u64::MAX;

/// Host-visible completion signal for queue submissions.
#[derive(Debug, Default)]
pub struct Fence(Owned<vk::Fence>);

impl AsRef<vk::Fence> for Fence {
    fn as_ref(&self) -> &vk::Fence {
        self.0.as_ref()
    }
}

impl Fence {
    pub fn create(device: &DeviceWeakRef) -> Result<Self> {
        Ok(Self(Owned::create(device, false)?))
    }

    pub fn create_signalled(device: &DeviceWeakRef) -> Result<Self> {
        Ok(Self(Owned::create(device, true)?))
    }

    pub fn into_inner(self) -> Owned<vk::Fence> {
        self.0
    }

    pub fn is_signalled(&self) -> Result<bool> {
        let device = self.0.live_device()?;
        Ok(device.driver().fence_status(self.0.raw())?)
    }

    /// Blocks until signalled. Elapsing `timeout` is an
    /// `Error::Vk(vk::Result::TIMEOUT)`.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<()> {
        Self::wait_all(&[self], timeout)
    }

    /// Blocks until every fence is signalled.
    ///
    /// # Panics
    ///
    /// If the fences were not all created from the same, still live, device.
    pub fn wait_all(fences: &[&Fence], timeout: Option<Duration>) -> Result<()> {
        let first = match fences.first() {
            Some(first) => first,
            None => return Ok(()),
        };
        if fences.iter().any(|fence| fence.0.is_null()) {
            return Err(Error::NullHandle(vk::ObjectType::FENCE));
        }
        let device = resolve(first.0.device());
        assert!(
            fences
                .iter()
                .all(|fence| fence.0.device().ptr_eq(first.0.device())),
            "fences from different devices waited on together"
        );
        let raws: Vec<vk::Fence> = fences.iter().map(|fence| fence.0.raw()).collect();
        Ok(device
            .driver()
            .wait_for_fences(&raws, true, timeout_nanos(timeout))?)
    }

    pub fn reset(&self) -> Result<()> {
        let device = self.0.live_device()?;
        Ok(device.driver().reset_fences(&[self.0.raw()])?)
    }
}

fn timeout_nanos(timeout: Option<Duration>) -> u64 {
    match timeout {
        Some(timeout) => u64::try_from(timeout.as_nanos()).unwrap_or(NO_TIMEOUT),
        None => NO_TIMEOUT,
    }
}
