//! Sync configuration

use limbsync_core::{Quat, SyncError, SyncResult};
use serde::{Deserialize, Serialize};

/// Default opt-in property key
pub const DEFAULT_PROPERTY_KEY: &str = "limbsync";

/// Sync engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Remote interpolation rate; each frame moves `dt * rate` of the way
    pub convergence_rate: f32,
    /// Local head leans below this angle (degrees) are not applied
    pub head_lean_threshold_deg: f32,
    /// Peer property advertising limbsync support
    pub property_key: String,
    /// Yaw (degrees) post-multiplied onto every arm rotation written to a rig
    pub arm_align_yaw_deg: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            convergence_rate: 12.0,
            head_lean_threshold_deg: 0.5,
            property_key: DEFAULT_PROPERTY_KEY.to_string(),
            arm_align_yaw_deg: -90.0,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        let config: SyncConfig =
            serde_json::from_str(json).map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if !(self.convergence_rate.is_finite() && self.convergence_rate > 0.0) {
            return Err(SyncError::InvalidConfig(format!(
                "convergence_rate must be positive, got {}",
                self.convergence_rate
            )));
        }
        if !(self.head_lean_threshold_deg.is_finite() && self.head_lean_threshold_deg >= 0.0) {
            return Err(SyncError::InvalidConfig(format!(
                "head_lean_threshold_deg must be non-negative, got {}",
                self.head_lean_threshold_deg
            )));
        }
        if !self.arm_align_yaw_deg.is_finite() {
            return Err(SyncError::InvalidConfig(
                "arm_align_yaw_deg must be finite".to_string(),
            ));
        }
        if self.property_key.is_empty() {
            return Err(SyncError::InvalidConfig(
                "property_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Rotation post-multiplied onto arm bones
    #[inline]
    pub fn arm_align_offset(&self) -> Quat {
        Quat::from_yaw(self.arm_align_yaw_deg)
    }

    /// Interpolation factor for a frame of `dt` seconds
    pub fn blend_factor(&self, dt: f32) -> f32 {
        let t = dt * self.convergence_rate;
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }
}
