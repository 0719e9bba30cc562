use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ash::extensions::ext::DebugUtils;
use ash::prelude::VkResult;
use ash::vk::{self, Handle};

use super::{CreateParams, Driver};
use crate::config::DeviceConfig;
use crate::error::{Error, Result};

const VALIDATION_LAYER: &[u8] = b"VK_LAYER_KHRONOS_validation\0";

const MESSAGE_SEVERITY: vk::DebugUtilsMessageSeverityFlagsEXT =
    vk::DebugUtilsMessageSeverityFlagsEXT::from_raw(
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE.as_raw()
            | vk::DebugUtilsMessageSeverityFlagsEXT::INFO.as_raw()
            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw()
            | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR.as_raw(),
    );

const MESSAGE_TYPE: vk::DebugUtilsMessageTypeFlagsEXT =
    vk::DebugUtilsMessageTypeFlagsEXT::from_raw(
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL.as_raw()
            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION.as_raw()
            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE.as_raw(),
    );

/// A headless Vulkan device: instance, one logical device and the queue
/// family command pools are created against. Dropping it destroys the
/// device and instance, which reclaims any child handle still alive.
pub struct VulkanDriver {
    _entry: ash::Entry,
    instance: ash::Instance,
    debug_messenger: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
    device: ash::Device,
    queue_family_index: u32,
    name: String,
}

impl std::fmt::Debug for VulkanDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("VulkanDriver")
            .field("name", &self.name)
            .field("queue_family_index", &self.queue_family_index)
            .finish()
    }
}

impl VulkanDriver {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()?;
            let validation = config.validation && has_validation_layer(&entry)?;
            if config.validation && !validation {
                log::warn!("validation requested but VK_LAYER_KHRONOS_validation is not installed");
            }

            let instance = create_instance(&entry, config, validation)?;

            let debug_messenger = if validation {
                match create_debug_messenger(&entry, &instance) {
                    Ok(messenger) => Some(messenger),
                    Err(err) => {
                        instance.destroy_instance(None);
                        return Err(err.into());
                    }
                }
            } else {
                None
            };

            match open_device(&instance, config) {
                Ok((device, queue_family_index, name)) => {
                    log::info!("opened {} (queue family {})", name, queue_family_index);
                    Ok(Self {
                        _entry: entry,
                        instance,
                        debug_messenger,
                        device,
                        queue_family_index,
                        name,
                    })
                }
                Err(err) => {
                    if let Some((utils, messenger)) = debug_messenger {
                        utils.destroy_debug_utils_messenger(messenger, None);
                    }
                    instance.destroy_instance(None);
                    Err(err)
                }
            }
        }
    }

    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }
}

impl Drop for VulkanDriver {
    fn drop(&mut self) {
        unsafe {
            if let Err(err) = self.device.device_wait_idle() {
                log::warn!("wait idle before teardown of {} failed: {}", self.name, err);
            }
            self.device.destroy_device(None);
            if let Some((utils, messenger)) = self.debug_messenger.take() {
                utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
        log::debug!("destroyed {}", self.name);
    }
}

impl Driver for VulkanDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_handle(&self, params: &CreateParams) -> VkResult<u64> {
        unsafe {
            match *params {
                CreateParams::Semaphore => self
                    .device
                    .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                    .map(|h| h.as_raw()),
                CreateParams::Fence { signalled } => {
                    let flags = if signalled {
                        vk::FenceCreateFlags::SIGNALED
                    } else {
                        vk::FenceCreateFlags::empty()
                    };
                    self.device
                        .create_fence(&vk::FenceCreateInfo::builder().flags(flags), None)
                        .map(|h| h.as_raw())
                }
                CreateParams::Event => self
                    .device
                    .create_event(&vk::EventCreateInfo::default(), None)
                    .map(|h| h.as_raw()),
                CreateParams::Sampler(info) => self
                    .device
                    .create_sampler(
                        &vk::SamplerCreateInfo::builder()
                            .min_filter(info.filter)
                            .mag_filter(info.filter)
                            .address_mode_u(info.address_mode)
                            .address_mode_v(info.address_mode)
                            .address_mode_w(info.address_mode)
                            .max_lod(vk::LOD_CLAMP_NONE),
                        None,
                    )
                    .map(|h| h.as_raw()),
                CreateParams::Buffer { size, usage } => self
                    .device
                    .create_buffer(
                        &vk::BufferCreateInfo::builder()
                            .size(size)
                            .usage(usage)
                            .sharing_mode(vk::SharingMode::EXCLUSIVE),
                        None,
                    )
                    .map(|h| h.as_raw()),
                CreateParams::CommandPool { flags } => self
                    .device
                    .create_command_pool(
                        &vk::CommandPoolCreateInfo::builder()
                            .flags(flags)
                            .queue_family_index(self.queue_family_index),
                        None,
                    )
                    .map(|h| h.as_raw()),
            }
        }
    }

    unsafe fn destroy_handle(&self, kind: vk::ObjectType, raw: u64) -> VkResult<()> {
        match kind {
            vk::ObjectType::SEMAPHORE => self
                .device
                .destroy_semaphore(vk::Semaphore::from_raw(raw), None),
            vk::ObjectType::FENCE => self.device.destroy_fence(vk::Fence::from_raw(raw), None),
            vk::ObjectType::EVENT => self.device.destroy_event(vk::Event::from_raw(raw), None),
            vk::ObjectType::SAMPLER => self.device.destroy_sampler(vk::Sampler::from_raw(raw), None),
            vk::ObjectType::BUFFER => self.device.destroy_buffer(vk::Buffer::from_raw(raw), None),
            vk::ObjectType::COMMAND_POOL => self
                .device
                .destroy_command_pool(vk::CommandPool::from_raw(raw), None),
            _ => return Err(vk::Result::ERROR_UNKNOWN),
        }
        Ok(())
    }

    fn wait_for_fences(
        &self,
        fences: &[vk::Fence],
        wait_all: bool,
        timeout: u64,
    ) -> VkResult<()> {
        unsafe { self.device.wait_for_fences(fences, wait_all, timeout) }
    }

    fn reset_fences(&self, fences: &[vk::Fence]) -> VkResult<()> {
        unsafe { self.device.reset_fences(fences) }
    }

    fn fence_status(&self, fence: vk::Fence) -> VkResult<bool> {
        unsafe { self.device.get_fence_status(fence) }
    }

    fn set_event(&self, event: vk::Event) -> VkResult<()> {
        unsafe { self.device.set_event(event) }
    }

    fn reset_event(&self, event: vk::Event) -> VkResult<()> {
        unsafe { self.device.reset_event(event) }
    }

    fn event_status(&self, event: vk::Event) -> VkResult<bool> {
        unsafe { self.device.get_event_status(event) }
    }

    fn wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.device_wait_idle() }
    }
}

unsafe fn has_validation_layer(entry: &ash::Entry) -> Result<bool> {
    let wanted = CStr::from_bytes_with_nul_unchecked(VALIDATION_LAYER);
    Ok(entry
        .enumerate_instance_layer_properties()?
        .iter()
        .any(|layer| CStr::from_ptr(layer.layer_name.as_ptr()) == wanted))
}

unsafe fn create_instance(
    entry: &ash::Entry,
    config: &DeviceConfig,
    validation: bool,
) -> Result<ash::Instance> {
    let app_name = CString::new(config.application_name.as_str()).unwrap_or_default();
    let app_info = vk::ApplicationInfo::builder()
        .application_name(&app_name)
        .engine_name(&app_name)
        .api_version(vk::API_VERSION_1_0);

    let mut layers: Vec<*const c_char> = Vec::new();
    let mut extensions: Vec<*const c_char> = Vec::new();
    if validation {
        layers.push(VALIDATION_LAYER.as_ptr().cast());
        extensions.push(DebugUtils::name().as_ptr());
    }

    Ok(entry.create_instance(
        &vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions),
        None,
    )?)
}

unsafe fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> VkResult<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
    let utils = DebugUtils::new(entry, instance);
    let messenger = utils.create_debug_utils_messenger(
        &vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(MESSAGE_SEVERITY)
            .message_type(MESSAGE_TYPE)
            .pfn_user_callback(Some(debug_callback)),
        None,
    )?;
    Ok((utils, messenger))
}

/// Picks a physical device and queue family, then creates the logical
/// device. Returns the device, queue family index and device name.
unsafe fn open_device(
    instance: &ash::Instance,
    config: &DeviceConfig,
) -> Result<(ash::Device, u32, String)> {
    let physical_devices = instance.enumerate_physical_devices()?;

    let candidates: Vec<(vk::PhysicalDevice, u32)> = match config.device_index {
        Some(index) => physical_devices
            .get(index)
            .and_then(|&pd| queue_family(instance, pd).map(|family| (pd, family)))
            .into_iter()
            .collect(),
        None => physical_devices
            .iter()
            .filter_map(|&pd| queue_family(instance, pd).map(|family| (pd, family)))
            .collect(),
    };

    let discrete = candidates.iter().find(|(pd, _)| {
        instance.get_physical_device_properties(*pd).device_type
            == vk::PhysicalDeviceType::DISCRETE_GPU
    });
    let chosen = if config.prefer_discrete {
        discrete.or_else(|| candidates.first())
    } else {
        candidates.first()
    };
    let (physical_device, queue_family_index) = match chosen {
        Some(&pair) => pair,
        None => return Err(Error::NoSuitableDevice),
    };

    let props = instance.get_physical_device_properties(physical_device);
    let name = CStr::from_ptr(props.device_name.as_ptr())
        .to_string_lossy()
        .into_owned();

    let priorities = [1.0];
    let queue_infos = [vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(queue_family_index)
        .queue_priorities(&priorities)
        .build()];
    let device = instance.create_device(
        physical_device,
        &vk::DeviceCreateInfo::builder().queue_create_infos(&queue_infos),
        None,
    )?;

    Ok((device, queue_family_index, name))
}

/// First queue family that can run graphics or compute work.
unsafe fn queue_family(instance: &ash::Instance, pd: vk::PhysicalDevice) -> Option<u32> {
    instance
        .get_physical_device_queue_family_properties(pd)
        .iter()
        .position(|props| {
            props
                .queue_flags
                .intersects(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
        })
        .map(|index| index as u32)
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let data = &*p_callback_data;
    let message = if data.p_message.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(data.p_message).to_string_lossy()
    };
    let id_name = if data.p_message_id_name.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(data.p_message_id_name).to_string_lossy()
    };

    log::log!(
        message_level(message_severity),
        "{:?}: [{}: {}] {}",
        message_types,
        id_name,
        data.message_id_number,
        message,
    );

    vk::FALSE
}

fn message_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Debug
    } else {
        log::Level::Trace
    }
}
