use std::rc::Rc;
use std::time::Duration;

use ash::vk;

use vk_owned::device::{BufferObject, CommandPool, Event, Fence, Semaphore};
use vk_owned::{Device, DeviceConfig, DeviceWeakRef, Driver, RecordingDriver, Result, VulkanDriver};

struct FrameSync {
    image_available: Semaphore,
    render_finished: Semaphore,
    in_flight: Fence,
}

impl FrameSync {
    fn create(device: &DeviceWeakRef) -> Result<Self> {
        Ok(Self {
            image_available: Semaphore::create(device)?,
            render_finished: Semaphore::create(device)?,
            in_flight: Fence::create_signalled(device)?,
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--recording") => exercise(RecordingDriver::new(), Teardown::DeviceFirst),
        Some(path) => exercise(
            VulkanDriver::new(&DeviceConfig::load(path)?)?,
            Teardown::ChildrenFirst,
        ),
        None => exercise(
            VulkanDriver::new(&DeviceConfig::default())?,
            Teardown::ChildrenFirst,
        ),
    }
}

/// Order of the final teardown. A real device must outlive its children,
/// so dropping it first is only done against the recording driver.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Teardown {
    ChildrenFirst,
    DeviceFirst,
}

fn exercise(driver: impl Driver + 'static, teardown: Teardown) -> Result<()> {
    let device = Device::new(driver);
    let weak = Rc::downgrade(&device);

    let frames = [FrameSync::create(&weak)?, FrameSync::create(&weak)?];
    for (index, frame) in frames.iter().enumerate() {
        frame.in_flight.wait(Some(Duration::from_secs(1)))?;
        frame.in_flight.reset()?;
        log::info!(
            "frame {}: image_available={:?} render_finished={:?} in_flight={:?}",
            index,
            frame.image_available,
            frame.render_finished,
            frame.in_flight,
        );
    }

    let event = Event::create(&weak)?;
    event.set()?;
    log::info!("event set: {}", event.is_set()?);

    let staging = BufferObject::create(&weak, 64 * 1024, vk::BufferUsageFlags::TRANSFER_SRC)?;
    let pool = CommandPool::transient(&weak)?;
    log::info!("{} handle(s) live on {}", device.live_handles(), device.name());

    // Ordinary teardown for these, children first.
    drop(pool);
    drop(event);
    device.wait_idle()?;

    match teardown {
        Teardown::ChildrenFirst => {
            drop(staging);
            drop(frames);
            drop(device);
        }
        // The frames and buffer skip their destroys.
        Teardown::DeviceFirst => {
            drop(device);
            drop(staging);
            drop(frames);
        }
    }

    Ok(())
}
