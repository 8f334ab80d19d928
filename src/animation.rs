use log::trace;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SELECTION_DURATION: Duration = Duration::from_millis(250);

pub const DEFAULT_HOVER_DURATION: Duration = Duration::from_millis(100);

/// Maps the linear progress of an animation onto the value it reports
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolator {
    #[default]
    Linear,
    /// Starts fast and slows down towards the end
    Decelerate,
}

impl Interpolator {
    pub fn interpolate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Interpolator::Linear => t,
            Interpolator::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AnimationKind {
    /// A transition between two selections
    Selection,
    /// The hover highlight fading in, or out when reversed
    Hover,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Animation {
    kind: AnimationKind,
    reversed: bool,
    duration: Duration,
    elapsed: Duration,
}

impl Animation {
    fn progress(&self) -> f32 {
        if self.elapsed >= self.duration {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Drives at most one animation at a time from frame ticks.
///
/// Starting an animation while another one is running ends the running one
/// at once, and the caller applies its final state.  The exception is the
/// same kind of animation played in the other direction, which picks up
/// from wherever the interrupted one had got to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Animator {
    interpolator: Interpolator,
    running: Option<Animation>,
}

impl Animator {
    pub fn new(interpolator: Interpolator) -> Animator {
        Animator {
            interpolator,
            running: None,
        }
    }

    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    pub fn set_interpolator(&mut self, interpolator: Interpolator) {
        self.interpolator = interpolator;
    }

    /// Starts an animation of `kind` and returns the kind of the animation
    /// it cut short, if that one has to be completed by the caller
    pub fn start(
        &mut self,
        kind: AnimationKind,
        reversed: bool,
        duration: Duration,
    ) -> Option<AnimationKind> {
        let mut elapsed = Duration::ZERO;
        let mut interrupted = None;
        if let Some(old) = self.running.take() {
            if old.kind == kind && old.reversed != reversed && !old.is_finished() {
                elapsed = duration.mul_f32(1.0 - old.progress());
                trace!("Reversing {kind:?} animation at {:.2}", old.progress());
            } else {
                trace!("Ending {:?} animation early", old.kind);
                interrupted = Some(old.kind);
            }
        }
        trace!("Starting {kind:?} animation (reversed: {reversed}) for {duration:?}");
        self.running = Some(Animation {
            kind,
            reversed,
            duration,
            elapsed,
        });
        interrupted
    }

    /// Advances the running animation by `dt` and returns its kind if this
    /// finished it
    pub fn tick(&mut self, dt: Duration) -> Option<AnimationKind> {
        let anim = self.running.as_mut()?;
        anim.elapsed = anim.elapsed.saturating_add(dt);
        if anim.is_finished() {
            let kind = anim.kind;
            self.running = None;
            trace!("{kind:?} animation finished");
            Some(kind)
        } else {
            None
        }
    }

    /// Ends the running animation immediately, returning its kind
    pub fn end(&mut self) -> Option<AnimationKind> {
        self.running.take().map(|anim| anim.kind)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn running_kind(&self) -> Option<AnimationKind> {
        self.running.map(|anim| anim.kind)
    }

    /// The current value of the animation of `kind`, going from 0 to 1 (or
    /// from 1 to 0 when reversed), or `None` if no such animation is running
    pub fn value(&self, kind: AnimationKind) -> Option<f32> {
        let anim = self.running.filter(|anim| anim.kind == kind)?;
        let progress = anim.progress();
        let t = if anim.reversed {
            1.0 - progress
        } else {
            progress
        };
        Some(self.interpolator.interpolate(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn close(a: Option<f32>, b: f32) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-4)
    }

    #[test]
    fn test_interpolators() {
        assert!((Interpolator::Linear.interpolate(0.3) - 0.3).abs() < 1e-6);
        assert!((Interpolator::Decelerate.interpolate(0.5) - 0.75).abs() < 1e-6);
        assert!((Interpolator::Decelerate.interpolate(1.0) - 1.0).abs() < 1e-6);
        assert!(Interpolator::Decelerate.interpolate(-2.0).abs() < 1e-6);
    }

    #[test]
    fn test_runs_to_completion() {
        let mut animator = Animator::default();
        assert_eq!(
            animator.start(AnimationKind::Selection, false, MS * 100),
            None
        );
        assert!(close(animator.value(AnimationKind::Selection), 0.0));
        assert_eq!(animator.value(AnimationKind::Hover), None);
        assert_eq!(animator.tick(MS * 40), None);
        assert!(close(animator.value(AnimationKind::Selection), 0.4));
        assert_eq!(animator.tick(MS * 60), Some(AnimationKind::Selection));
        assert!(!animator.is_running());
        assert_eq!(animator.tick(MS * 60), None);
    }

    #[test]
    fn test_new_animation_ends_running_one() {
        let mut animator = Animator::default();
        animator.start(AnimationKind::Selection, false, MS * 100);
        animator.tick(MS * 30);
        assert_eq!(
            animator.start(AnimationKind::Hover, false, MS * 50),
            Some(AnimationKind::Selection)
        );
        assert!(close(animator.value(AnimationKind::Hover), 0.0));
        // The same kind in the same direction restarts from the beginning
        animator.tick(MS * 25);
        assert_eq!(
            animator.start(AnimationKind::Hover, false, MS * 50),
            Some(AnimationKind::Hover)
        );
        assert!(close(animator.value(AnimationKind::Hover), 0.0));
    }

    #[test]
    fn test_reverse_continues_from_interrupted_point() {
        let mut animator = Animator::default();
        animator.start(AnimationKind::Hover, false, MS * 100);
        animator.tick(MS * 70);
        assert!(close(animator.value(AnimationKind::Hover), 0.7));
        assert_eq!(animator.start(AnimationKind::Hover, true, MS * 100), None);
        assert!(close(animator.value(AnimationKind::Hover), 0.7));
        animator.tick(MS * 20);
        assert!(close(animator.value(AnimationKind::Hover), 0.5));
        assert_eq!(animator.tick(MS * 60), Some(AnimationKind::Hover));
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let mut animator = Animator::new(Interpolator::Decelerate);
        animator.start(AnimationKind::Selection, false, Duration::ZERO);
        assert!(close(animator.value(AnimationKind::Selection), 1.0));
        assert_eq!(animator.tick(Duration::ZERO), Some(AnimationKind::Selection));
        assert_eq!(animator.end(), None);
    }
}
