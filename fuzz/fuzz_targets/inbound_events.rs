#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use limbsync_core::PeerId;
use limbsync_pose::MapSkeleton;
use limbsync_sync::{BodySync, RecordingTransport};

#[derive(Arbitrary, Debug)]
struct Event {
    code: u8,
    payload: Vec<u8>,
    dt_ms: u8,
}

fuzz_target!(|events: Vec<Event>| {
    let sender = PeerId::new(2);
    let mut skeleton = MapSkeleton::full();
    let mut sync: BodySync<_, usize> = BodySync::new(RecordingTransport::new());
    sync.on_actor_created(sender, &skeleton);

    for event in events {
        let _ = sync.on_event(sender, event.code, &event.payload);
        sync.on_remote_tick(sender, &mut skeleton, event.dt_ms as f32 / 1000.0);
    }

    let Some(actor) = sync.remote(sender) else {
        return;
    };
    if let Some(body) = actor.state().body_rotation() {
        assert!((body.norm() - 1.0).abs() < 1e-3);
    }
});
