//! Lossy link model
//!
//! Reproduces what an unreliable room transport does to pose traffic:
//! latency with jitter, random and burst loss, late delivery (reordering)
//! and duplication. Every link is seeded so runs are reproducible.

use std::time::Duration;

use bytes::Bytes;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitter added on top of the base latency
#[derive(Clone, Debug)]
pub enum Jitter {
    None,
    Uniform { min_ms: u32, max_ms: u32 },
    /// Heavy tail, capped at one second
    Pareto { scale_ms: f64, shape: f64 },
}

impl Jitter {
    pub fn sample(&self, rng: &mut StdRng) -> Duration {
        match *self {
            Jitter::None => Duration::ZERO,
            Jitter::Uniform { min_ms, max_ms } => {
                if max_ms <= min_ms {
                    return Duration::from_millis(min_ms as u64);
                }
                let ms = Uniform::new(min_ms, max_ms).sample(rng);
                Duration::from_millis(ms as u64)
            }
            Jitter::Pareto { scale_ms, shape } => {
                let u: f64 = rng.gen_range(f64::EPSILON..1.0);
                let ms = (scale_ms / u.powf(1.0 / shape)).min(1000.0);
                Duration::from_millis(ms as u64)
            }
        }
    }
}

/// Link impairments
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    pub base_latency: Duration,
    pub jitter: Jitter,
    /// Independent loss probability per datagram
    pub loss_rate: f64,
    /// Probability that a datagram starts a loss burst
    pub burst_loss_prob: f64,
    /// Burst length range in datagrams, inclusive
    pub burst_length: (u32, u32),
    /// Probability that a datagram is held back and overtaken
    pub reorder_prob: f64,
    pub reorder_delay: Duration,
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self::good()
    }
}

impl ChaosConfig {
    /// Zero latency, nothing lost
    pub fn perfect() -> Self {
        ChaosConfig {
            base_latency: Duration::ZERO,
            jitter: Jitter::None,
            loss_rate: 0.0,
            burst_loss_prob: 0.0,
            burst_length: (0, 0),
            reorder_prob: 0.0,
            reorder_delay: Duration::ZERO,
            duplicate_prob: 0.0,
        }
    }

    pub fn good() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(20),
            jitter: Jitter::Uniform {
                min_ms: 0,
                max_ms: 10,
            },
            loss_rate: 0.005,
            burst_loss_prob: 0.0,
            burst_length: (1, 2),
            reorder_prob: 0.01,
            reorder_delay: Duration::from_millis(30),
            duplicate_prob: 0.001,
        }
    }

    pub fn poor() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(80),
            jitter: Jitter::Pareto {
                scale_ms: 20.0,
                shape: 1.5,
            },
            loss_rate: 0.05,
            burst_loss_prob: 0.05,
            burst_length: (3, 8),
            reorder_prob: 0.1,
            reorder_delay: Duration::from_millis(60),
            duplicate_prob: 0.02,
        }
    }

    pub fn hostile() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(200),
            jitter: Jitter::Pareto {
                scale_ms: 60.0,
                shape: 1.2,
            },
            loss_rate: 0.15,
            burst_loss_prob: 0.1,
            burst_length: (5, 15),
            reorder_prob: 0.2,
            reorder_delay: Duration::from_millis(150),
            duplicate_prob: 0.05,
        }
    }
}

/// A limbsync event on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datagram {
    pub code: u8,
    pub payload: Bytes,
}

#[derive(Clone, Debug)]
struct InFlight {
    datagram: Datagram,
    send_time: Duration,
    delivery_time: Duration,
    seq: u64,
}

/// Link counters
#[derive(Clone, Debug, Default)]
pub struct ChaosStats {
    pub sent: u64,
    pub delivered: u64,
    pub lost: u64,
    /// Delivered after a datagram sent later
    pub reordered: u64,
    pub duplicated: u64,
    pub max_latency: Duration,
}

impl ChaosStats {
    pub fn loss_rate(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            self.lost as f64 / self.sent as f64
        }
    }
}

/// One direction of a lossy link
pub struct ChaosLink {
    config: ChaosConfig,
    rng: StdRng,
    in_flight: Vec<InFlight>,
    now: Duration,
    burst_remaining: u32,
    next_seq: u64,
    last_delivered_seq: Option<u64>,
    stats: ChaosStats,
}

impl ChaosLink {
    pub fn new(config: ChaosConfig, seed: u64) -> Self {
        ChaosLink {
            config,
            rng: StdRng::seed_from_u64(seed),
            in_flight: Vec::new(),
            now: Duration::ZERO,
            burst_remaining: 0,
            next_seq: 0,
            last_delivered_seq: None,
            stats: ChaosStats::default(),
        }
    }

    pub fn send(&mut self, datagram: Datagram) {
        self.stats.sent += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.should_drop() {
            self.stats.lost += 1;
            return;
        }

        let mut latency = self.config.base_latency + self.config.jitter.sample(&mut self.rng);
        if self.rng.gen_bool(self.config.reorder_prob) {
            latency += self.config.reorder_delay;
        }

        if self.rng.gen_bool(self.config.duplicate_prob) {
            let extra = self.config.jitter.sample(&mut self.rng);
            self.stats.duplicated += 1;
            self.in_flight.push(InFlight {
                datagram: datagram.clone(),
                send_time: self.now,
                delivery_time: self.now + latency + extra,
                seq,
            });
        }

        self.in_flight.push(InFlight {
            datagram,
            send_time: self.now,
            delivery_time: self.now + latency,
            seq,
        });
    }

    fn should_drop(&mut self) -> bool {
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            return true;
        }
        if self.rng.gen_bool(self.config.burst_loss_prob) {
            let (min, max) = self.config.burst_length;
            self.burst_remaining = self.rng.gen_range(min..=max.max(min)).saturating_sub(1);
            return true;
        }
        self.rng.gen_bool(self.config.loss_rate)
    }

    /// Advance the link clock and return everything due, in arrival order
    pub fn tick(&mut self, dt: Duration) -> Vec<Datagram> {
        self.now += dt;

        let now = self.now;
        let mut due: Vec<InFlight> = Vec::new();
        self.in_flight.retain(|p| {
            if p.delivery_time <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| (p.delivery_time, p.seq));

        let mut delivered = Vec::with_capacity(due.len());
        for packet in due {
            if self.last_delivered_seq.is_some_and(|last| packet.seq < last) {
                self.stats.reordered += 1;
            }
            let newest = self.last_delivered_seq.map_or(packet.seq, |l| l.max(packet.seq));
            self.last_delivered_seq = Some(newest);

            let latency = packet.delivery_time - packet.send_time;
            self.stats.delivered += 1;
            self.stats.max_latency = self.stats.max_latency.max(latency);
            delivered.push(packet.datagram);
        }
        delivered
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datagram(i: u8) -> Datagram {
        Datagram {
            code: 0xB0,
            payload: Bytes::copy_from_slice(&[i, 0, 0, 0]),
        }
    }

    #[test]
    fn test_perfect_link_delivers_in_order() {
        let mut link = ChaosLink::new(ChaosConfig::perfect(), 1);
        for i in 0..10 {
            link.send(datagram(i));
        }
        let delivered = link.tick(Duration::from_millis(1));
        assert_eq!(delivered.len(), 10);
        assert_eq!(delivered[3], datagram(3));
        assert_eq!(link.stats().reordered, 0);
    }

    #[test]
    fn test_latency_holds_datagrams() {
        let mut config = ChaosConfig::perfect();
        config.base_latency = Duration::from_millis(50);
        let mut link = ChaosLink::new(config, 1);

        link.send(datagram(0));
        assert!(link.tick(Duration::from_millis(40)).is_empty());
        assert_eq!(link.tick(Duration::from_millis(10)).len(), 1);
        assert_eq!(link.in_flight(), 0);
    }

    #[test]
    fn test_hostile_link_loses_and_reorders() {
        let mut link = ChaosLink::new(ChaosConfig::hostile(), 12345);
        for round in 0..1000u32 {
            link.send(datagram(round as u8));
            link.tick(Duration::from_millis(10));
        }
        link.tick(Duration::from_secs(5));

        let stats = link.stats();
        assert!(stats.loss_rate() > 0.1);
        assert!(stats.reordered > 0);
        assert_eq!(stats.delivered, stats.sent - stats.lost + stats.duplicated);
    }
}
