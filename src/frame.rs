use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use thiserror::Error;

use crate::camera::{CameraFollower, CameraPose};
use crate::player::actor::ActorState;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FrameError {
    #[error("actor world position {0} is not finite")]
    NonFinitePosition(Vec3),
}

/// Elapsed time of the previous frame, the only state carried between ticks.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameClock {
    previous_elapsed: f32,
}

impl FrameClock {
    /// Records `elapsed` and returns the time since the last call.
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        let delta = elapsed - self.previous_elapsed;
        self.previous_elapsed = elapsed;
        delta
    }

    pub const fn previous_elapsed(&self) -> f32 {
        self.previous_elapsed
    }
}

/// Stops a [`FrameScheduler`] from anywhere that holds a clone.
#[derive(Debug, Default, Clone)]
pub struct SchedulerHandle(Arc<AtomicBool>);

impl SchedulerHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs one frame at a time: clock, clips, then the camera pose.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    clock: FrameClock,
    handle: SchedulerHandle,
    frames: u64,
}

impl FrameScheduler {
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_stopped()
    }

    pub const fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances one frame. Returns `Ok(None)` once stopped.
    ///
    /// A fault only affects the current frame: the clock and clips have
    /// already moved on, and the next tick starts from a clean slate.
    pub fn tick(
        &mut self,
        elapsed: f32,
        actor: &mut ActorState,
        follower: &CameraFollower,
    ) -> Result<Option<CameraPose>, FrameError> {
        if !self.is_running() {
            return Ok(None);
        }

        let delta = self.clock.advance(elapsed);
        self.frames += 1;

        let model_position = match actor.loaded_mut() {
            Some(loaded) => {
                loaded.clips.advance(delta);
                loaded.actor.world_position()
            }
            None => Vec3::ZERO,
        };

        if !model_position.is_finite() {
            return Err(FrameError::NonFinitePosition(model_position));
        }

        Ok(Some(follower.follow(model_position)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::camera::CAMERA_OFFSET;
    use crate::player::actor::{Actor, LoadedActor};
    use crate::player::animations::{ClipId, ClipLibrary, ClipSet};

    fn loaded_at(position: Vec3) -> ActorState {
        ActorState::Loaded(LoadedActor::new(
            Actor {
                position,
                ..default()
            },
            ClipLibrary::new(ClipSet::splat(2.0)),
        ))
    }

    #[test]
    fn clock_reports_deltas() {
        let mut clock = FrameClock::default();
        assert_relative_eq!(clock.advance(0.016), 0.016);
        assert_relative_eq!(clock.advance(0.05), 0.034, epsilon = 1e-6);
        assert_relative_eq!(clock.previous_elapsed(), 0.05);
    }

    #[test]
    fn camera_watches_origin_until_actor_loads() {
        let mut scheduler = FrameScheduler::default();
        let mut actor = ActorState::Unloaded;

        let pose = scheduler
            .tick(0.1, &mut actor, &CameraFollower::default())
            .unwrap()
            .unwrap();

        assert_eq!(pose.position, CAMERA_OFFSET);
        assert_eq!(pose.target, Vec3::ZERO);
        assert!(actor.is_unloaded());
    }

    #[test]
    fn camera_follows_loaded_actor() {
        let mut scheduler = FrameScheduler::default();
        let follower = CameraFollower::default();
        let mut actor = loaded_at(Vec3::new(0.0, 0.0, -0.1));

        let pose = scheduler.tick(0.5, &mut actor, &follower).unwrap().unwrap();
        assert_eq!(pose, follower.follow(Vec3::new(0.0, 0.0, -0.1)));

        if let Some(loaded) = actor.loaded_mut() {
            loaded.actor.position = Vec3::new(3.0, 0.0, 3.0);
        }
        let pose = scheduler.tick(0.6, &mut actor, &follower).unwrap().unwrap();
        assert_eq!(pose.position, Vec3::new(3.0, 0.0, 3.0) + CAMERA_OFFSET);
        assert_eq!(pose.target, Vec3::new(3.0, 0.0, 3.0));
    }

    #[test]
    fn tick_advances_active_clips_by_frame_delta() {
        let mut scheduler = FrameScheduler::default();
        let follower = CameraFollower::default();
        let mut actor = loaded_at(Vec3::ZERO);

        scheduler.tick(1.0, &mut actor, &follower).unwrap();
        if let Some(loaded) = actor.loaded_mut() {
            loaded.clips.start(ClipId::Walk);
        }
        scheduler.tick(1.25, &mut actor, &follower).unwrap();
        scheduler.tick(1.5, &mut actor, &follower).unwrap();

        let clips = &actor.loaded().unwrap().clips;
        assert_relative_eq!(clips.clip(ClipId::Walk).playhead, 0.5);
        assert_eq!(clips.clip(ClipId::LookAround).playhead, 0.0);
    }

    #[test]
    fn clock_going_backwards_is_harmless() {
        let mut scheduler = FrameScheduler::default();
        let follower = CameraFollower::default();
        let mut actor = loaded_at(Vec3::ZERO);
        if let Some(loaded) = actor.loaded_mut() {
            loaded.clips.start(ClipId::Walk);
        }

        scheduler.tick(1.0, &mut actor, &follower).unwrap();
        assert!(scheduler.tick(0.5, &mut actor, &follower).is_ok());
        assert_relative_eq!(
            actor.loaded().unwrap().clips.clip(ClipId::Walk).playhead,
            1.0
        );
    }

    #[test]
    fn stopped_scheduler_does_nothing() {
        let mut scheduler = FrameScheduler::default();
        let handle = scheduler.handle();
        let follower = CameraFollower::default();
        let mut actor = ActorState::Unloaded;

        scheduler.tick(0.1, &mut actor, &follower).unwrap();
        handle.stop();

        assert!(!scheduler.is_running());
        assert_eq!(scheduler.tick(0.2, &mut actor, &follower), Ok(None));
        assert_eq!(scheduler.frames(), 1);
        assert_relative_eq!(scheduler.clock().previous_elapsed(), 0.1);
    }

    #[test]
    fn faulted_frame_does_not_stop_the_next() {
        let mut scheduler = FrameScheduler::default();
        let follower = CameraFollower::default();
        let mut actor = loaded_at(Vec3::new(f32::NAN, 0.0, 0.0));

        assert!(matches!(
            scheduler.tick(0.1, &mut actor, &follower),
            Err(FrameError::NonFinitePosition(_))
        ));

        if let Some(loaded) = actor.loaded_mut() {
            loaded.actor.position = Vec3::X;
        }
        let pose = scheduler.tick(0.2, &mut actor, &follower).unwrap().unwrap();
        assert_eq!(pose.target, Vec3::X);
        assert_eq!(scheduler.frames(), 2);
    }
}
