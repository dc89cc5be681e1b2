use bevy::prelude::*;

use crate::player::controller::*;
use crate::runtime::FrameSet;

pub mod actor;
pub mod animations;
pub mod controller;

/// Keyboard locomotion and the actor's scene entity. Needs no renderer or
/// asset plugins, so it runs headless.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_actor_loaded);
        app.add_systems(
            Update,
            (handle_key_events, sync_actor_parent)
                .chain()
                .in_set(FrameSet::Input),
        );
        app.add_systems(Update, sync_actor_transform.in_set(FrameSet::Present));
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(LocomotionPlugin);
        app.add_plugins(animations::ClipPlaybackPlugin);
    }
}
