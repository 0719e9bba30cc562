//! Device-owned handles.
//!
//! A [`Device`] owns a [`Driver`] and is shared as a [`DeviceRef`]. Every
//! handle created from it keeps only a [`DeviceWeakRef`], so handles never
//! keep their device alive. Handles dropped after the device skip their
//! destroy call, since tearing down the device reclaimed them already.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use ash::prelude::VkResult;
use ash::vk;

use crate::driver::{CreateParams, Driver};
use crate::error::{Error, Result};

pub use buffer::*;
pub use command_pool::*;
pub use event::*;
pub use fence::*;
pub use raw_handle::*;
pub use sampler::*;
pub use semaphore::*;

mod buffer;
mod command_pool;
mod event;
mod fence;
mod raw_handle;
mod sampler;
mod semaphore;

pub type DeviceRef = Rc<Device>;
pub type DeviceWeakRef = Weak<Device>;

/// An open device and the driver behind it.
///
/// Handles are created and destroyed only through [`Owned`] and the
/// wrappers built on it; the device's own create and destroy entry points
/// are not public, so safe code cannot destroy a handle something else
/// still owns:
///
/// ```compile_fail
/// use ash::vk;
/// use vk_owned::{Device, RecordingDriver};
///
/// let device = Device::new(RecordingDriver::new());
/// let _ = unsafe { device.destroy_handle(vk::ObjectType::SEMAPHORE, 0x1000) };
/// ```
pub struct Device {
    driver: Box<dyn Driver>,
    live: Cell<usize>,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("driver", &self.driver.name())
            .field("live", &self.live.get())
            .finish()
    }
}

impl Device {
    pub fn new(driver: impl Driver + 'static) -> DeviceRef {
        log::debug!("device {} opened", driver.name());
        Rc::new(Self {
            driver: Box::new(driver),
            live: Cell::new(0),
        })
    }

    pub fn name(&self) -> &str {
        self.driver.name()
    }

    pub(crate) fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    /// Number of handles created and not yet destroyed through this device.
    pub fn live_handles(&self) -> usize {
        self.live.get()
    }

    pub(crate) fn create_handle(&self, params: &CreateParams) -> Result<u64> {
        let kind = params.kind();
        let raw = self
            .driver
            .create_handle(params)
            .map_err(|source| Error::Create { kind, source })?;
        self.live.set(self.live.get() + 1);
        log::debug!("created {:?} {:#x}", kind, raw);
        Ok(raw)
    }

    /// Destroys a raw handle. The handle counts as gone even when the
    /// driver reports a failure.
    ///
    /// # Safety
    ///
    /// `raw` must have come from `create_handle` on this device with the
    /// same `kind` and must not have been destroyed already.
    pub(crate) unsafe fn destroy_handle(&self, kind: vk::ObjectType, raw: u64) -> VkResult<()> {
        let live = self.live.get();
        debug_assert!(live > 0, "destroying {:?} {:#x} with no live handles", kind, raw);
        self.live.set(live - 1);
        log::debug!("destroying {:?} {:#x}", kind, raw);
        self.driver.destroy_handle(kind, raw)
    }

    pub fn wait_idle(&self) -> Result<()> {
        Ok(self.driver.wait_idle()?)
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let live = self.live.get();
        if live > 0 {
            log::warn!(
                "device {} torn down with {} live handle(s); they will not be destroyed individually",
                self.driver.name(),
                live,
            );
        } else {
            log::debug!("device {} torn down", self.driver.name());
        }
    }
}

/// Upgrades a back-reference for use.
///
/// # Panics
///
/// If the device has already been dropped. Creating from or operating on
/// a handle whose device is gone means the ownership order was broken
/// upstream.
pub fn resolve(device: &DeviceWeakRef) -> DeviceRef {
    match device.upgrade() {
        Some(device) => device,
        None => panic!("device used after it was destroyed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RecordingDriver;
    use crate::testing::capture_logs;

    #[test]
    fn counts_live_handles() {
        let device = Device::new(RecordingDriver::new());
        let a = device.create_handle(&CreateParams::Semaphore).unwrap();
        let b = device.create_handle(&CreateParams::Event).unwrap();
        assert_eq!(device.live_handles(), 2);
        unsafe { device.destroy_handle(vk::ObjectType::SEMAPHORE, a) }.unwrap();
        assert_eq!(device.live_handles(), 1);
        unsafe { device.destroy_handle(vk::ObjectType::EVENT, b) }.unwrap();
        assert_eq!(device.live_handles(), 0);
    }

    #[test]
    fn failed_create_is_not_counted() {
        let driver = RecordingDriver::new();
        driver
            .journal()
            .fail_next_create(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        let device = Device::new(driver);
        match device.create_handle(&CreateParams::Fence { signalled: false }) {
            Err(Error::Create { kind, source }) => {
                assert_eq!(kind, vk::ObjectType::FENCE);
                assert_eq!(source, vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
            }
            other => panic!("expected create error, got {:?}", other),
        }
        assert_eq!(device.live_handles(), 0);
    }

    #[test]
    fn failed_destroy_still_releases_the_count() {
        let driver = RecordingDriver::new();
        let journal = driver.journal();
        let device = Device::new(driver);
        let raw = device.create_handle(&CreateParams::Semaphore).unwrap();
        journal.fail_destroys(vk::Result::ERROR_DEVICE_LOST);
        assert_eq!(
            unsafe { device.destroy_handle(vk::ObjectType::SEMAPHORE, raw) },
            Err(vk::Result::ERROR_DEVICE_LOST)
        );
        assert_eq!(device.live_handles(), 0);
    }

    #[test]
    fn teardown_warns_about_live_handles() {
        let driver = RecordingDriver::new();
        let journal = driver.journal();
        let ((), logs) = capture_logs(|| {
            let device = Device::new(driver);
            let weak = Rc::downgrade(&device);
            let _fence = Fence::create(&weak).unwrap();
            let _event = Event::create(&weak).unwrap();
            assert_eq!(device.live_handles(), 2);
            drop(device);
        });
        let warnings = logs.warnings();
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("2 live handle(s)"), "{}", warnings[0]);
        assert!(journal.destroys().is_empty());
        assert!(journal.device_destroyed());
    }

    #[test]
    fn clean_teardown_does_not_warn() {
        let ((), logs) = capture_logs(|| {
            let device = Device::new(RecordingDriver::new());
            drop(Semaphore::create(&Rc::downgrade(&device)).unwrap());
            assert_eq!(device.live_handles(), 0);
        });
        assert!(logs.warnings().is_empty(), "{:?}", logs.warnings());
    }

    #[test]
    fn resolve_returns_live_device() {
        let device = Device::new(RecordingDriver::new());
        let weak = Rc::downgrade(&device);
        assert!(Rc::ptr_eq(&resolve(&weak), &device));
    }

    #[test]
    #[should_panic(expected = "device used after it was destroyed")]
    fn resolve_panics_once_device_is_gone() {
        let device = Device::new(RecordingDriver::new());
        let weak = Rc::downgrade(&device);
        drop(device);
        resolve(&weak);
    }
}
