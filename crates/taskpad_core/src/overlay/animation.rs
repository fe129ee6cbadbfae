//! Time-driven interpolation primitives used by overlay motion.

use std::time::Duration;

const SPRING_SUBSTEP_SECS: f64 = 0.001;

/// Damped spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Distance from target under which the spring may come to rest.
    pub rest_displacement: f64,
    /// Speed under which the spring may come to rest.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_displacement: 0.001,
            rest_speed: 0.001,
        }
    }
}

/// In-flight offset animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Fixed-duration ease-in-out interpolation.
    Timing {
        from: f64,
        to: f64,
        elapsed: Duration,
        duration: Duration,
    },
    /// Physics spring toward `target`.
    Spring { target: f64, velocity: f64 },
}

impl Animation {
    pub fn timing(from: f64, to: f64, duration: Duration) -> Self {
        Self::Timing {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn spring(target: f64) -> Self {
        Self::Spring {
            target,
            velocity: 0.0,
        }
    }

    /// Advances by `dt` from `offset`.
    ///
    /// Returns the new offset and the animation still running, or `None`
    /// once it has landed exactly on its target.
    pub fn step(self, offset: f64, dt: Duration, spring: &SpringConfig) -> (f64, Option<Self>) {
        match self {
            Self::Timing {
                from,
                to,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed >= duration {
                    return (to, None);
                }
                let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
                let value = from + (to - from) * ease_in_out(progress);
                (
                    value,
                    Some(Self::Timing {
                        from,
                        to,
                        elapsed,
                        duration,
                    }),
                )
            }
            Self::Spring { target, velocity } => step_spring(offset, target, velocity, dt, spring),
        }
    }
}

/// Cubic ease-in-out over `t ∈ [0, 1]`.
pub(crate) fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn step_spring(
    mut offset: f64,
    target: f64,
    mut velocity: f64,
    dt: Duration,
    config: &SpringConfig,
) -> (f64, Option<Animation>) {
    let mut remaining = dt.as_secs_f64();
    while remaining > 0.0 {
        let h = remaining.min(SPRING_SUBSTEP_SECS);
        remaining -= h;

        let force = -config.stiffness * (offset - target) - config.damping * velocity;
        velocity += force / config.mass * h;
        offset += velocity * h;

        if (offset - target).abs() < config.rest_displacement && velocity.abs() < config.rest_speed
        {
            return (target, None);
        }
    }
    (offset, Some(Animation::Spring { target, velocity }))
}

#[cfg(test)]
mod tests {
    use super::{ease_in_out, Animation, SpringConfig};
    use std::time::Duration;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn timing_lands_exactly_on_target() {
        let animation = Animation::timing(300.0, 0.0, Duration::from_millis(300));
        let (offset, next) =
            animation.step(300.0, Duration::from_millis(150), &SpringConfig::default());
        assert!((offset - 150.0).abs() < 1e-6);
        let (offset, next) = next
            .expect("still running")
            .step(offset, Duration::from_millis(150), &SpringConfig::default());
        assert_eq!(offset, 0.0);
        assert!(next.is_none());
    }

    #[test]
    fn spring_settles_on_target() {
        let (offset, next) = Animation::spring(0.0).step(
            149.0,
            Duration::from_secs(10),
            &SpringConfig::default(),
        );
        assert_eq!(offset, 0.0);
        assert!(next.is_none());
    }

    #[test]
    fn stiffer_host_spring_settles_on_target() {
        let stock = SpringConfig {
            stiffness: 230.0,
            damping: 22.0,
            ..SpringConfig::default()
        };
        let (offset, next) = Animation::spring(0.0).step(149.0, Duration::from_secs(2), &stock);
        assert_eq!(offset, 0.0);
        assert!(next.is_none());
    }

    #[test]
    fn spring_is_still_moving_shortly_after_release() {
        let (offset, next) = Animation::spring(0.0).step(
            149.0,
            Duration::from_millis(50),
            &SpringConfig::default(),
        );
        assert!(offset < 149.0 && offset > 0.0);
        assert!(next.is_some());
    }
}
