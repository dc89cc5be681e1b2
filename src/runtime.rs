use bevy::prelude::*;

use crate::camera::{CameraFollower, CameraPose, FollowCamera};
use crate::frame::{FrameError, FrameScheduler};
use crate::player::actor::ActorState;
use crate::player::controller::{InputAction, LocomotionController, PlayerRoot};

/// Order of the per-frame work inside `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Key events mutate the actor.
    Input,
    /// Clock, clips and camera pose.
    Tick,
    /// Scene entities catch up with the runtime.
    Present,
}

/// Everything the locomotion and camera logic mutates between frames.
#[derive(Resource, Default)]
pub struct SceneRuntime {
    pub actor: ActorState,
    pub locomotion: LocomotionController,
    pub follower: CameraFollower,
    pub scheduler: FrameScheduler,
}

impl SceneRuntime {
    pub fn key_down(&mut self, key: KeyCode) -> Option<InputAction> {
        self.locomotion.key_down(key, &mut self.actor)
    }

    pub fn key_up(&mut self, key: KeyCode) -> Option<InputAction> {
        self.locomotion.key_up(key, &mut self.actor)
    }

    pub fn tick(&mut self, elapsed: f32) -> Result<Option<CameraPose>, FrameError> {
        self.scheduler.tick(elapsed, &mut self.actor, &self.follower)
    }
}

pub struct RuntimePlugin;

impl Plugin for RuntimePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneRuntime>();
        app.configure_sets(
            Update,
            (FrameSet::Input, FrameSet::Tick, FrameSet::Present).chain(),
        );
        app.add_systems(Update, advance_frame.in_set(FrameSet::Tick));
    }
}

fn advance_frame(
    time: Res<Time>,
    mut runtime: ResMut<SceneRuntime>,
    mut cameras: Query<&mut Transform, (With<FollowCamera>, Without<PlayerRoot>)>,
) {
    match runtime.tick(time.elapsed_secs()) {
        Ok(Some(pose)) => {
            let target = pose.transform();
            for mut transform in cameras.iter_mut() {
                *transform = target;
            }
        }
        Ok(None) => {}
        Err(err) => warn!("skipping camera update: {err}"),
    }
}
