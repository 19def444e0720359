//! Multi-peer network simulator

use std::collections::HashMap;
use std::time::Duration;

use limbsync_core::PeerId;
use limbsync_sync::OutboundEvent;

use crate::chaos::{ChaosConfig, ChaosLink, ChaosStats, Datagram};

/// Directed links between peers, created on first use
pub struct NetworkSimulator {
    links: HashMap<(PeerId, PeerId), ChaosLink>,
    default_config: ChaosConfig,
    seed: u64,
    now: Duration,
}

impl NetworkSimulator {
    pub fn new(default_config: ChaosConfig, seed: u64) -> Self {
        NetworkSimulator {
            links: HashMap::new(),
            default_config,
            seed,
            now: Duration::ZERO,
        }
    }

    pub fn perfect() -> Self {
        Self::new(ChaosConfig::perfect(), 0)
    }

    /// Link seeds derive from the simulator seed and the endpoints, so
    /// results do not depend on link creation order
    fn link_seed(&self, from: PeerId, to: PeerId) -> u64 {
        let pair = ((from.actor_number() as u32 as u64) << 32) | to.actor_number() as u32 as u64;
        self.seed ^ pair.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn link(&mut self, from: PeerId, to: PeerId) -> &mut ChaosLink {
        let seed = self.link_seed(from, to);
        let config = &self.default_config;
        let now = self.now;
        self.links.entry((from, to)).or_insert_with(|| {
            let mut link = ChaosLink::new(config.clone(), seed);
            link.tick(now);
            link
        })
    }

    pub fn set_link_config(&mut self, from: PeerId, to: PeerId, config: ChaosConfig) {
        let seed = self.link_seed(from, to);
        let mut link = ChaosLink::new(config, seed);
        link.tick(self.now);
        self.links.insert((from, to), link);
    }

    pub fn send(&mut self, from: PeerId, to: PeerId, datagram: Datagram) {
        self.link(from, to).send(datagram);
    }

    /// Fan an engine's raised event out to each of its targets
    pub fn send_event(&mut self, from: PeerId, event: &OutboundEvent) {
        let datagram = Datagram {
            code: event.code.to_byte(),
            payload: event.payload.clone(),
        };
        for &to in &event.targets {
            self.send(from, to, datagram.clone());
        }
    }

    /// Advance every link; returns `(from, to, datagram)` in per-link arrival order
    pub fn tick(&mut self, dt: Duration) -> Vec<(PeerId, PeerId, Datagram)> {
        self.now += dt;
        let mut delivered = Vec::new();
        for (&(from, to), link) in self.links.iter_mut() {
            delivered.extend(link.tick(dt).into_iter().map(|d| (from, to, d)));
        }
        delivered
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn link_stats(&self, from: PeerId, to: PeerId) -> Option<&ChaosStats> {
        self.links.get(&(from, to)).map(|l| l.stats())
    }

    /// Sum of every link's counters
    pub fn total_stats(&self) -> ChaosStats {
        let mut total = ChaosStats::default();
        for link in self.links.values() {
            let s = link.stats();
            total.sent += s.sent;
            total.delivered += s.delivered;
            total.lost += s.lost;
            total.reordered += s.reordered;
            total.duplicated += s.duplicated;
            total.max_latency = total.max_latency.max(s.max_latency);
        }
        total
    }
}
