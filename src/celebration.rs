//! Confetti: per-particle randomisation and the CSS that animates it.

use crate::rng::RandomSource;

pub const CONFETTI_PALETTE: &[&str] = &["#ff1493", "#ff69b4", "#ff6b9d", "#ffa8b9", "#ffc0cb"];
pub const PARTICLE_COUNT: u32 = 100;
pub const SPAWN_STAGGER_MS: u32 = 20;
pub const PARTICLE_LIFETIME_MS: u32 = 5000;
pub const MIN_FALL_SECS: f64 = 2.0;
pub const FALL_SECS_SPREAD: f64 = 3.0;
pub const KEYFRAMES_NAME: &str = "confettiFall";
pub const PARTICLE_CLASS: &str = "confetti";

/// One confetti piece, fully randomised at spawn time.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub color: String,
    pub left_vw: f64,
    pub opacity: f64,
    pub rotation_deg: f64,
    pub fall_secs: f64,
}

impl Particle {
    pub fn random<C: AsRef<str>>(palette: &[C], rng: &mut impl RandomSource) -> Self {
        let color = palette
            .get(rng.index(palette.len()))
            .map(|c| c.as_ref().to_string())
            .unwrap_or_else(|| CONFETTI_PALETTE[0].to_string());
        Self {
            color,
            left_vw: rng.next_unit() * 100.0,
            opacity: rng.next_unit(),
            rotation_deg: rng.next_unit() * 360.0,
            fall_secs: MIN_FALL_SECS + rng.next_unit() * FALL_SECS_SPREAD,
        }
    }

    /// Inline style for the particle's `<div>`.
    pub fn css_text(&self) -> String {
        format!(
            "position: fixed; width: 10px; height: 10px; background: {}; left: {}vw; top: -10px; \
             opacity: {}; transform: rotate({}deg); animation: {} {}s linear forwards; z-index: 9999;",
            self.color, self.left_vw, self.opacity, self.rotation_deg, KEYFRAMES_NAME, self.fall_secs
        )
    }
}

/// Shared end-of-fall transform, drawn once per page load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallKeyframes {
    pub drift_px: f64,
    pub spin_deg: f64,
}

impl FallKeyframes {
    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self { drift_px: rng.range(-100.0, 100.0), spin_deg: rng.next_unit() * 720.0 }
    }

    pub fn css_rule(&self) -> String {
        format!(
            "@keyframes {} {{ to {{ top: 100vh; transform: translateX({}px) rotate({}deg); }} }}",
            KEYFRAMES_NAME, self.drift_px, self.spin_deg
        )
    }
}

/// Timing knobs for one celebration burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurstTiming {
    pub count: u32,
    pub stagger_ms: u32,
    pub lifetime_ms: u32,
}

impl Default for BurstTiming {
    fn default() -> Self {
        Self { count: PARTICLE_COUNT, stagger_ms: SPAWN_STAGGER_MS, lifetime_ms: PARTICLE_LIFETIME_MS }
    }
}

impl BurstTiming {
    /// Delay from launch until particle `i` spawns.
    pub fn spawn_delay(&self, i: u32) -> u32 {
        i.saturating_mul(self.stagger_ms)
    }

    /// Time from launch until the last particle is gone.
    pub fn total_ms(&self) -> u32 {
        match self.count {
            0 => 0,
            n => self.spawn_delay(n - 1).saturating_add(self.lifetime_ms),
        }
    }
}
