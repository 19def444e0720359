//! End-to-end pose sync scenarios
//!
//! One sending peer drives a [`SimRig`] from a [`PoseScript`] and streams it
//! through a [`NetworkSimulator`] to any number of observers. Each observer
//! runs its own [`BodySync`] and reconstructs the sender on a headless
//! avatar skeleton.

use std::time::Duration;

use limbsync_core::{PeerId, Quat, SyncResult};
use limbsync_pose::{Joint, MapSkeleton, Skeleton};
use limbsync_sync::{BodySync, Peer, PropertyStore, RecordingTransport, StaticRoom, SyncConfig};
use limbsync_wire::angular_distance;

use crate::chaos::ChaosConfig;
use crate::rig::SimRig;
use crate::script::PoseScript;
use crate::simulator::NetworkSimulator;

/// Joints compared between sender and observers
pub const COMPARED_JOINTS: [Joint; 6] = [
    Joint::LowerSpine,
    Joint::UpperSpine,
    Joint::LeftUpperArm,
    Joint::LeftForearm,
    Joint::RightUpperArm,
    Joint::RightForearm,
];

/// A remote peer watching the sender
pub struct Observer {
    pub id: PeerId,
    pub opted_in: bool,
    pub sync: BodySync<RecordingTransport, usize>,
    pub avatar: MapSkeleton,
}

/// Running scenario
pub struct Scenario<P> {
    sender: PeerId,
    room: StaticRoom,
    sim: NetworkSimulator,
    local: BodySync<RecordingTransport, usize>,
    rig: SimRig,
    observers: Vec<Observer>,
    script: P,
    frame_dt: Duration,
    elapsed: Duration,
}

impl<P: PoseScript> Scenario<P> {
    /// Advance one frame on every peer
    pub fn step(&mut self) {
        let frame = self.script.frame(self.elapsed.as_secs_f32());

        self.local.on_local_tick(&mut self.rig, &frame);
        self.local
            .on_serialize_outbound(&mut self.rig, &frame, &self.room, |_| ());
        for event in self.local.transport_mut().drain() {
            self.sim.send_event(self.sender, &event);
        }

        self.elapsed += self.frame_dt;
        for (from, to, datagram) in self.sim.tick(self.frame_dt) {
            let Some(observer) = self.observers.iter_mut().find(|o| o.id == to) else {
                continue;
            };
            if let Err(e) = observer.sync.on_event(from, datagram.code, &datagram.payload) {
                tracing::debug!(%from, %to, error = %e, "observer dropped event");
            }
        }

        let dt = self.frame_dt.as_secs_f32();
        for observer in &mut self.observers {
            observer
                .sync
                .on_remote_tick(self.sender, &mut observer.avatar, dt);
        }
    }

    /// Run whole frames for at least `duration`
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.elapsed + duration;
        while self.elapsed < end {
            self.step();
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn sender(&self) -> PeerId {
        self.sender
    }

    pub fn rig(&self) -> &SimRig {
        &self.rig
    }

    pub fn local(&self) -> &BodySync<RecordingTransport, usize> {
        &self.local
    }

    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    pub fn network(&self) -> &NetworkSimulator {
        &self.sim
    }

    /// Angle (radians) between the sender's bone and an observer's copy
    pub fn joint_error(&self, observer: usize, joint: Joint) -> Option<f32> {
        let local = self.rig.joint_rotation(joint)?;
        let remote = self.observers.get(observer)?.avatar.joint_rotation(joint)?;
        Some(angular_distance(local, remote))
    }

    /// Largest error over [`COMPARED_JOINTS`]
    pub fn pose_error(&self, observer: usize) -> f32 {
        COMPARED_JOINTS
            .iter()
            .filter_map(|&j| self.joint_error(observer, j))
            .fold(0.0, f32::max)
    }

    pub fn root_error(&self, observer: usize) -> Option<f32> {
        let remote = self.observers.get(observer)?.avatar.root_rotation();
        Some(angular_distance(self.rig.root_rotation(), remote))
    }

    /// Observer's copy of the sender's root rotation
    pub fn observed_root(&self, observer: usize) -> Option<Quat> {
        Some(self.observers.get(observer)?.avatar.root_rotation())
    }
}

/// Builds a [`Scenario`]
pub struct ScenarioBuilder {
    observers: usize,
    vanilla_observers: usize,
    network: ChaosConfig,
    seed: u64,
    frame_rate: u32,
    config: SyncConfig,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        ScenarioBuilder {
            observers: 1,
            vanilla_observers: 0,
            network: ChaosConfig::perfect(),
            seed: 0,
            frame_rate: 60,
            config: SyncConfig::default(),
        }
    }

    /// Observers advertising limbsync support
    pub fn with_observers(mut self, count: usize) -> Self {
        self.observers = count;
        self
    }

    /// Observers without the property
    pub fn with_vanilla_observers(mut self, count: usize) -> Self {
        self.vanilla_observers = count;
        self
    }

    pub fn with_network(mut self, config: ChaosConfig) -> Self {
        self.network = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps.max(1);
        self
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails when the sync config does not validate
    pub fn build<P: PoseScript>(self, script: P) -> SyncResult<Scenario<P>> {
        let key = self.config.property_key.clone();
        let sender = PeerId::new(1);
        let mut room =
            StaticRoom::with_local_properties(sender, PropertyStore::new().with(&key, true));

        let total = self.observers + self.vanilla_observers;
        let mut observers = Vec::with_capacity(total);
        for i in 0..total {
            let id = PeerId::new(i as i32 + 2);
            let opted_in = i < self.observers;
            let props = if opted_in {
                PropertyStore::new().with(&key, true)
            } else {
                PropertyStore::new()
            };
            room.join(Peer::with_properties(id, props));

            let avatar = MapSkeleton::full();
            let mut sync = BodySync::try_with_config(self.config.clone(), RecordingTransport::new())?;
            sync.on_actor_created(sender, &avatar);
            observers.push(Observer {
                id,
                opted_in,
                sync,
                avatar,
            });
        }

        let local = BodySync::try_with_config(self.config, RecordingTransport::new())?;
        Ok(Scenario {
            sender,
            room,
            sim: NetworkSimulator::new(self.network, self.seed),
            local,
            rig: SimRig::new(),
            observers,
            script,
            frame_dt: Duration::from_secs(1) / self.frame_rate,
            elapsed: Duration::ZERO,
        })
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
