use std::rc::Rc;

use ash::vk::{self, Handle};

use vk_owned::device::{AsRawHandle, BufferObject, Event, Fence, Sampler, Semaphore};
use vk_owned::driver::{Call, CreateParams, SamplerInfo};
use vk_owned::{Device, RecordingDriver};

#[test]
fn handle_dropped_after_its_device_is_skipped() {
    let driver = RecordingDriver::new();
    let journal = driver.journal();
    let d1 = Device::new(driver);

    let h1 = Semaphore::create(&Rc::downgrade(&d1)).unwrap();
    let raw: vk::Semaphore = h1.as_raw();
    assert_ne!(raw, vk::Semaphore::null());

    drop(d1);
    drop(h1);

    assert!(journal.destroys().is_empty());
    assert_eq!(journal.calls().last(), Some(&Call::DestroyDevice));
}

#[test]
fn moved_handle_is_destroyed_once_by_its_new_owner() {
    let driver = RecordingDriver::new();
    let journal = driver.journal();
    let d2 = Device::new(driver);

    let mut h2 = Semaphore::create(&Rc::downgrade(&d2)).unwrap();
    let original: vk::Semaphore = h2.as_raw();
    let original = original.as_raw();
    let h3 = std::mem::take(&mut h2);

    drop(h2);
    assert!(journal.destroys().is_empty());

    drop(h3);
    assert_eq!(
        journal.destroys(),
        vec![(vk::ObjectType::SEMAPHORE, original)]
    );

    assert_eq!(d2.live_handles(), 0);
    drop(d2);
    assert!(journal.device_destroyed());
}

#[test]
fn mixed_kinds_tear_down_in_any_order() {
    let driver = RecordingDriver::new();
    let journal = driver.journal();
    let device = Device::new(driver);
    let weak = Rc::downgrade(&device);

    let fence = Fence::create(&weak).unwrap();
    let event = Event::create(&weak).unwrap();
    let sampler = Sampler::linear(&weak).unwrap();
    let buffer = BufferObject::create(&weak, 16, vk::BufferUsageFlags::VERTEX_BUFFER).unwrap();

    let event_raw: vk::Event = event.as_raw();
    let event_raw = event_raw.as_raw();
    let buffer_raw: vk::Buffer = buffer.as_raw();
    let buffer_raw = buffer_raw.as_raw();

    drop(event);
    drop(buffer);
    assert_eq!(device.live_handles(), 2);

    drop(device);
    drop(fence);
    drop(sampler);

    assert_eq!(
        journal.calls(),
        vec![
            Call::Create {
                params: CreateParams::Fence { signalled: false },
                raw: journal_raw(&journal, 0),
            },
            Call::Create { params: CreateParams::Event, raw: event_raw },
            Call::Create {
                params: CreateParams::Sampler(SamplerInfo {
                    filter: vk::Filter::LINEAR,
                    ..SamplerInfo::default()
                }),
                raw: journal_raw(&journal, 2),
            },
            Call::Create {
                params: CreateParams::Buffer {
                    size: 16,
                    usage: vk::BufferUsageFlags::VERTEX_BUFFER,
                },
                raw: buffer_raw,
            },
            Call::Destroy { kind: vk::ObjectType::EVENT, raw: event_raw },
            Call::Destroy { kind: vk::ObjectType::BUFFER, raw: buffer_raw },
            Call::DestroyDevice,
        ]
    );
}

fn journal_raw(journal: &vk_owned::driver::Journal, index: usize) -> u64 {
    match journal.calls()[index] {
        Call::Create { raw, .. } => raw,
        other => panic!("call {} is not a create: {:?}", index, other),
    }
}

#[test]
fn every_live_handle_is_unique() {
    let device = Device::new(RecordingDriver::new());
    let weak = Rc::downgrade(&device);

    let semaphores: Vec<Semaphore> = (0..8).map(|_| Semaphore::create(&weak).unwrap()).collect();
    let fences: Vec<Fence> = (0..8).map(|_| Fence::create(&weak).unwrap()).collect();

    let mut raws: Vec<u64> = semaphores
        .iter()
        .map(|s| AsRawHandle::<vk::Semaphore>::as_raw(s).as_raw())
        .chain(
            fences
                .iter()
                .map(|f| AsRawHandle::<vk::Fence>::as_raw(f).as_raw()),
        )
        .collect();
    raws.sort_unstable();
    raws.dedup();
    assert_eq!(raws.len(), 16);
    assert_eq!(device.live_handles(), 16);
}
