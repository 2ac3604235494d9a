//! Particle emitter component.
//!
//! Responsibilities:
//! - fixed-rate emission driven by an accumulator over real dt
//! - per-particle aging, motion, and keyframe evaluation
//! - one flat colored quad per live particle at draw time

use rand::Rng;

use crate::coords::{ColorRgba, Vec2};
use crate::render::GpuDevice;
use crate::scene::graph::DrawCtx;
use crate::scene::Transform;

/// One live particle. Start values are frozen at emission so keyframe
/// evaluation stays anchored even if the emitter is reconfigured.
#[derive(Debug, Copy, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub color: ColorRgba,
    pub lifetime: f32,
    pub speed: f32,
    pub size: f32,
    pub rotation_deg: f32,
    start_color: ColorRgba,
    start_lifetime: f32,
    start_speed: f32,
    start_size: f32,
}

/// Accumulator-driven particle emitter.
///
/// While playing, every elapsed `1 / particles_per_second` of accumulated
/// dt emits one particle, capped at `max_particles` (excess is dropped).
/// Live particles age by dt and are removed once their lifetime reaches
/// zero; position integrates along the emission angle; color, speed and
/// size are evaluated from piecewise-linear keyframe lists over the
/// normalized life fraction `1 - lifetime / start_lifetime`.
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    pub particles_per_second: f32,

    pub start_color: ColorRgba,
    pub start_lifetime: f32,
    pub start_speed: f32,
    pub start_size: f32,

    pub color_over_life: Vec<ColorRgba>,
    pub speed_over_life: Vec<f32>,
    pub size_over_life: Vec<f32>,

    /// Emission angle range in degrees, clamped to [0, 360] on update.
    pub min_angle: f32,
    pub max_angle: f32,

    pub max_particles: usize,

    playing: bool,
    accumulator: f32,
    particles: Vec<Particle>,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self {
            particles_per_second: 4.0,
            start_color: ColorRgba::white(),
            start_lifetime: 2.0,
            start_speed: 5.0,
            start_size: 5.0,
            color_over_life: Vec::new(),
            speed_over_life: Vec::new(),
            size_over_life: Vec::new(),
            min_angle: 0.0,
            max_angle: 360.0,
            max_particles: 1000,
            playing: false,
            accumulator: 0.0,
            particles: Vec::new(),
        }
    }
}

impl ParticleEmitter {
    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Stops emission and discards every live particle.
    pub fn stop_immediate(&mut self) {
        self.playing = false;
        self.particles.clear();
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Emits `count` particles immediately, regardless of play state.
    pub fn emit(&mut self, count: usize) {
        let mut rng = rand::thread_rng();
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                return;
            }
            let rotation_deg = if self.min_angle < self.max_angle {
                rng.gen_range(self.min_angle..self.max_angle)
            } else {
                self.min_angle
            };
            self.particles.push(Particle {
                position: Vec2::zero(),
                color: self.start_color,
                lifetime: self.start_lifetime,
                speed: self.start_speed,
                size: self.start_size,
                rotation_deg,
                start_color: self.start_color,
                start_lifetime: self.start_lifetime,
                start_speed: self.start_speed,
                start_size: self.start_size,
            });
        }
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if self.particles_per_second <= 0.0 {
            return;
        }

        self.min_angle = self.min_angle.clamp(0.0, 360.0);
        self.max_angle = self.max_angle.clamp(0.0, 360.0);

        if self.playing {
            self.accumulator += dt;
            let quantum = 1.0 / self.particles_per_second;
            while self.accumulator >= quantum {
                self.accumulator -= quantum;
                self.emit(1);
            }
        }

        let color_keys = std::mem::take(&mut self.color_over_life);
        let speed_keys = std::mem::take(&mut self.speed_over_life);
        let size_keys = std::mem::take(&mut self.size_over_life);

        self.particles.retain_mut(|p| {
            p.lifetime -= dt;
            if p.lifetime <= 0.0 {
                return false;
            }

            p.position += Vec2::from_angle_deg(p.rotation_deg) * p.speed * 10.0 * dt;

            let t = (1.0 - p.lifetime / p.start_lifetime).clamp(0.0, 1.0);
            p.color = evaluate(p.start_color, &color_keys, t);
            p.speed = evaluate(p.start_speed, &speed_keys, t);
            p.size = evaluate(p.start_size, &size_keys, t);
            true
        });

        self.color_over_life = color_keys;
        self.speed_over_life = speed_keys;
        self.size_over_life = size_keys;
    }

    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        for p in &self.particles {
            ctx.batcher.draw_quad(
                transform.position + p.position,
                Vec2::splat(p.size),
                p.color,
            );
        }
    }
}

// ── keyframe evaluation ───────────────────────────────────────────────────

trait Keyed: Copy {
    fn mix(a: Self, b: Self, t: f32) -> Self;
}

impl Keyed for f32 {
    #[inline]
    fn mix(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t.clamp(0.0, 1.0)
    }
}

impl Keyed for ColorRgba {
    #[inline]
    fn mix(a: Self, b: Self, t: f32) -> Self {
        ColorRgba::lerp(a, b, t)
    }
}

/// `n` keys divide [0, 1] into `n` equal segments; the first segment runs
/// from the frozen start value to the first key.
fn evaluate<T: Keyed>(start: T, keys: &[T], t: f32) -> T {
    if keys.is_empty() {
        return start;
    }

    let scaled = t * keys.len() as f32;
    let index = scaled as usize;
    let local = scaled - index as f32;

    let from = if index == 0 { start } else { keys[index - 1] };
    let to = if index < keys.len() {
        keys[index]
    } else {
        keys[keys.len() - 1]
    };
    T::mix(from, to, local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_with_lifetime_two_survives_exactly_four_half_second_updates() {
        let mut e = ParticleEmitter {
            start_lifetime: 2.0,
            ..Default::default()
        };
        e.emit(1);

        for _ in 0..3 {
            e.update(0.5);
            assert_eq!(e.particles().len(), 1);
        }
        e.update(0.5);
        assert!(e.particles().is_empty());
    }

    #[test]
    fn two_per_second_over_two_seconds_emits_four() {
        let mut e = ParticleEmitter {
            particles_per_second: 2.0,
            start_lifetime: 100.0,
            ..Default::default()
        };
        e.play();

        for _ in 0..20 {
            e.update(0.1);
        }
        assert_eq!(e.particles().len(), 4);
    }

    #[test]
    fn emission_stops_at_max_particles() {
        let mut e = ParticleEmitter {
            max_particles: 3,
            ..Default::default()
        };
        e.emit(10);
        assert_eq!(e.particles().len(), 3);
    }

    #[test]
    fn stopped_emitter_still_ages_live_particles() {
        let mut e = ParticleEmitter {
            start_lifetime: 1.0,
            ..Default::default()
        };
        e.emit(2);
        e.stop();
        e.update(2.0);
        assert!(e.particles().is_empty());
    }

    #[test]
    fn zero_rate_freezes_the_system() {
        let mut e = ParticleEmitter {
            particles_per_second: 0.0,
            start_lifetime: 1.0,
            ..Default::default()
        };
        e.emit(1);
        e.update(10.0);
        assert_eq!(e.particles().len(), 1);
    }

    #[test]
    fn keyframes_anchor_at_the_start_value() {
        // One key: [0, 1] is a single segment from start to the key.
        assert_eq!(evaluate(10.0, &[20.0], 0.0), 10.0);
        assert_eq!(evaluate(10.0, &[20.0], 0.5), 15.0);
        assert_eq!(evaluate(10.0, &[20.0], 1.0), 20.0);
    }

    #[test]
    fn keyframes_split_life_into_equal_segments() {
        // Two keys: start -> 4 over [0, 0.5], 4 -> 8 over [0.5, 1].
        assert_eq!(evaluate(0.0, &[4.0, 8.0], 0.25), 2.0);
        assert_eq!(evaluate(0.0, &[4.0, 8.0], 0.5), 4.0);
        assert_eq!(evaluate(0.0, &[4.0, 8.0], 0.75), 6.0);
        assert_eq!(evaluate(0.0, &[4.0, 8.0], 1.0), 8.0);
    }

    #[test]
    fn size_follows_keyframes_while_aging() {
        let mut e = ParticleEmitter {
            start_size: 10.0,
            start_lifetime: 2.0,
            size_over_life: vec![0.0],
            min_angle: 0.0,
            max_angle: 0.0,
            ..Default::default()
        };
        e.emit(1);
        e.update(1.0);
        // t = 0.5 after one second of a two second life.
        let p = e.particles()[0];
        assert!((p.size - 5.0).abs() < 1e-5);
    }
}
