//! Per-vertex motion for the animated interior points
//!
//! Each interior point wanders in straight segments. A segment picks a random
//! displacement and a random duration, and the point then covers
//! `displacement / duration` every frame until the segment completes. Segments
//! that would carry a point onto or past the field boundary are redirected back
//! toward it, so interior points stay strictly inside the rectangle.

use glam::DVec2;
use rand::Rng;

use crate::config::MotionConfig;

/// Animation state of one interior point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    /// No segment chosen yet; the next advance picks one
    NeedsTarget,
    /// Travelling along a segment
    Moving {
        /// Frames elapsed in this segment
        frame: u32,
        /// Total displacement for this segment
        target: DVec2,
        /// Frames allotted to this segment (at least 1)
        duration: u32,
    },
}

/// A point position together with its motion state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedVertex {
    /// Current position (mesh-local, y up)
    pub position: DVec2,
    /// Current segment
    pub motion: MotionState,
}

impl AnimatedVertex {
    /// Create a resting vertex that picks a segment on its first advance
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            motion: MotionState::NeedsTarget,
        }
    }

    /// Whether the next advance starts a new segment
    ///
    /// True before the first segment, once the current one has completed, and
    /// when the frame counter exceeds `ceiling` (which happens after the
    /// configured frame count is lowered mid-segment).
    pub fn needs_target(&self, ceiling: u32) -> bool {
        match self.motion {
            MotionState::NeedsTarget => true,
            MotionState::Moving { frame, duration, .. } => frame >= duration || frame > ceiling,
        }
    }

    /// Advance one frame, picking a new segment first when needed
    ///
    /// `bounds` is the half extent of the field: points stay within
    /// `(-bounds.x, bounds.x)` x `(-bounds.y, bounds.y)`.
    pub fn advance<R: Rng>(&mut self, rng: &mut R, motion: &MotionConfig, bounds: DVec2) {
        if self.needs_target(motion.frames) {
            self.motion = pick_motion(rng, motion, self.position, bounds);
        }

        if let MotionState::Moving {
            frame,
            target,
            duration,
        } = &mut self.motion
        {
            self.position += *target / f64::from(*duration);
            *frame += 1;
        }
    }
}

/// Choose the next segment for a point at `position`
pub fn pick_motion<R: Rng>(
    rng: &mut R,
    motion: &MotionConfig,
    position: DVec2,
    bounds: DVec2,
) -> MotionState {
    let d = motion.distance;
    let dr = d * motion.randomness;
    let f = f64::from(motion.frames.saturating_sub(1));
    let fr = f * motion.randomness;

    let x = displacement(rng, dr, d);
    let x = keep_inside(rng, position.x, x, bounds.x);
    let y = displacement(rng, dr, d);
    let y = keep_inside(rng, position.y, y, bounds.y);

    let duration = 1 + uniform(rng, fr, f).round() as u32;

    MotionState::Moving {
        frame: 0,
        target: DVec2::new(x, y),
        duration,
    }
}

/// Signed displacement whose magnitude on either side lies in `[dr, d)`
fn displacement<R: Rng>(rng: &mut R, dr: f64, d: f64) -> f64 {
    let low = -uniform(rng, dr, d);
    let high = uniform(rng, dr, d);
    uniform(rng, low, high)
}

/// Redirect a displacement that would reach or leave `[-half, half]`
///
/// The replacement heads toward the boundary on the point's own side but
/// covers less than half of the remaining gap.
fn keep_inside<R: Rng>(rng: &mut R, position: f64, delta: f64, half: f64) -> f64 {
    if (position + delta).abs() < half {
        return delta;
    }

    let edge = if position > 0.0 { half } else { -half };
    (edge - position) * uniform(rng, 0.0, 0.5)
}

/// Uniform value between `a` and `b`; `a == b` or `a > b` are both allowed
#[inline]
fn uniform<R: Rng>(rng: &mut R, a: f64, b: f64) -> f64 {
    a + (b - a) * rng.gen::<f64>()
}
