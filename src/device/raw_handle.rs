use std::fmt;
use std::mem;
use std::rc::Weak;

use ash::vk::{self, Handle};

use super::{resolve, Device, DeviceRef, DeviceWeakRef};
use crate::driver::{CreateParams, SamplerInfo};
use crate::error::{Error, Result};

/// A `vk` handle type that can be owned by [`Owned`].
pub trait RawHandle: vk::Handle + Copy + Eq + fmt::Debug {
    fn null() -> Self {
        Self::from_raw(0)
    }

    fn is_null(self) -> bool {
        self == Self::null()
    }
}

pub trait Create<Info>: RawHandle {
    fn create(device: &Device, info: Info) -> Result<Self>;
}

pub trait AsRawHandle<T: RawHandle> {
    fn as_raw(&self) -> T;
}

impl<T: RawHandle, R: AsRef<T>> AsRawHandle<T> for R {
    fn as_raw(&self) -> T {
        *self.as_ref()
    }
}

/// Sole owner of one device-created handle.
///
/// Holds a weak back-reference to the creating [`Device`]. On drop the
/// handle is destroyed through that device, or skipped if the device is
/// already gone. A null `Owned` (from [`Default`], [`Owned::take`] or
/// [`Owned::into_raw`]) drops without doing anything.
pub struct Owned<T: RawHandle> {
    device: DeviceWeakRef,
    raw: T,
}

impl<T: RawHandle> AsRef<T> for Owned<T> {
    fn as_ref(&self) -> &T {
        &self.raw
    }
}

impl<T: RawHandle> Default for Owned<T> {
    fn default() -> Self {
        Self {
            device: Weak::new(),
            raw: T::null(),
        }
    }
}

impl<T: RawHandle> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.raw).finish()
    }
}

impl<T: RawHandle> Owned<T> {
    /// # Panics
    ///
    /// If `device` no longer resolves.
    pub fn create<I>(device: &DeviceWeakRef, info: I) -> Result<Self>
    where
        T: Create<I>,
    {
        let raw = T::create(&resolve(device), info)?;
        Ok(Self {
            device: device.clone(),
            raw,
        })
    }

    /// Takes ownership of a handle created elsewhere.
    ///
    /// # Safety
    ///
    /// `raw` must have been created by `device`'s driver, must not be owned
    /// by anything else, and must not be destroyed by anything else.
    pub unsafe fn from_raw(device: DeviceWeakRef, raw: T) -> Self {
        Self { device, raw }
    }

    /// Releases ownership without destroying the handle.
    pub fn into_raw(mut self) -> T {
        mem::replace(&mut self.raw, T::null())
    }

    /// Moves ownership out, leaving `self` null.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// The owned handle; null once ownership has moved out.
    pub fn raw(&self) -> T {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    pub fn device(&self) -> &DeviceWeakRef {
        &self.device
    }

    /// Destroys the handle now rather than at end of scope.
    pub fn destroy(self) {}

    /// The device to run an operation on this handle through.
    ///
    /// # Panics
    ///
    /// If the handle is live but its device is gone.
    pub(crate) fn live_device(&self) -> Result<DeviceRef> {
        if self.is_null() {
            return Err(Error::NullHandle(T::TYPE));
        }
        Ok(resolve(&self.device))
    }

    fn release(&mut self) {
        let raw = mem::replace(&mut self.raw, T::null());
        if raw.is_null() {
            return;
        }
        match self.device.upgrade() {
            Some(device) => {
                // Only this `Owned` held `raw`, and it is null from here on.
                if let Err(err) = unsafe { device.destroy_handle(T::TYPE, raw.as_raw()) } {
                    log::warn!("failed to destroy {:?} {:#x}: {}", T::TYPE, raw.as_raw(), err);
                }
            }
            None => log::debug!(
                "device gone, skipping destroy of {:?} {:#x}",
                T::TYPE,
                raw.as_raw()
            ),
        }
    }
}

impl<T: RawHandle> Drop for Owned<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl RawHandle for vk::Semaphore {}
impl Create<()> for vk::Semaphore {
    fn create(device: &Device, _info: ()) -> Result<Self> {
        device
            .create_handle(&CreateParams::Semaphore)
            .map(Self::from_raw)
    }
}

impl RawHandle for vk::Fence {}
impl Create<bool> for vk::Fence {
    fn create(device: &Device, signalled: bool) -> Result<Self> {
        device
            .create_handle(&CreateParams::Fence { signalled })
            .map(Self::from_raw)
    }
}

impl RawHandle for vk::Event {}
impl Create<()> for vk::Event {
    fn create(device: &Device, _info: ()) -> Result<Self> {
        device
            .create_handle(&CreateParams::Event)
            .map(Self::from_raw)
    }
}

impl RawHandle for vk::Sampler {}
impl Create<SamplerInfo> for vk::Sampler {
    fn create(device: &Device, info: SamplerInfo) -> Result<Self> {
        device
            .create_handle(&CreateParams::Sampler(info))
            .map(Self::from_raw)
    }
}

impl RawHandle for vk::Buffer {}
impl Create<(vk::DeviceSize, vk::BufferUsageFlags)> for vk::Buffer {
    fn create(
        device: &Device,
        (size, usage): (vk::DeviceSize, vk::BufferUsageFlags),
    ) -> Result<Self> {
        device
            .create_handle(&CreateParams::Buffer { size, usage })
            .map(Self::from_raw)
    }
}

impl RawHandle for vk::CommandPool {}
impl Create<vk::CommandPoolCreateFlags> for vk::CommandPool {
    fn create(device: &Device, flags: vk::CommandPoolCreateFlags) -> Result<Self> {
        device
            .create_handle(&CreateParams::CommandPool { flags })
            .map(Self::from_raw)
    }
}
