use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use crate::assets::ModelLoadError;
use crate::player::animations::{ClipLibrary, ClipSet};

/// Uniform scale applied to the fox model.
pub const ACTOR_SCALE: f32 = 0.025;

/// The four yaw orientations the actor can face.
///
/// `North` looks down world `-Z`, away from the default camera.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    #[default]
    South,
    North,
    East,
    West,
}

impl Heading {
    pub const fn yaw(self) -> f32 {
        match self {
            Heading::South => 0.0,
            Heading::North => PI,
            Heading::East => FRAC_PI_2,
            Heading::West => -FRAC_PI_2,
        }
    }
}

/// The controllable character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// Position relative to `parent`.
    pub position: Vec3,
    pub heading: Heading,
    pub scale: f32,
    /// Transform of the node the actor hangs off, kept in step with the scene
    /// graph every frame. Identity at the scene root.
    pub parent: GlobalTransform,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: Heading::default(),
            scale: ACTOR_SCALE,
            parent: GlobalTransform::IDENTITY,
        }
    }
}

impl Actor {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position)
            .with_rotation(Quat::from_rotation_y(self.heading.yaw()))
            .with_scale(Vec3::splat(self.scale))
    }

    pub fn world_position(&self) -> Vec3 {
        self.parent.transform_point(self.position)
    }
}

/// An actor together with the clips bound to its skeleton.
#[derive(Debug, Clone)]
pub struct LoadedActor {
    pub actor: Actor,
    pub clips: ClipLibrary,
}

impl LoadedActor {
    pub fn new(actor: Actor, clips: ClipLibrary) -> Self {
        Self { actor, clips }
    }
}

/// Triggered once the actor enters the `Loaded` state, carrying what the scene needs to show it.
#[derive(Event, Debug, Clone)]
pub struct ActorLoaded {
    pub transform: Transform,
    pub scene: Handle<Scene>,
    pub clips: ClipSet<Handle<AnimationClip>>,
}

/// Outcomes reported by the model loader.
#[derive(Debug)]
pub enum ModelLoadEvent {
    Progress,
    Loaded(LoadedActor),
    Failed(ModelLoadError),
}

/// Lifecycle of the actor while its model loads in the background.
///
/// Both `Loaded` and `Failed` are terminal.
#[derive(Debug, Default)]
pub enum ActorState {
    #[default]
    Unloaded,
    Loaded(LoadedActor),
    Failed,
}

impl ActorState {
    pub const fn is_unloaded(&self) -> bool {
        matches!(self, ActorState::Unloaded)
    }

    pub fn loaded(&self) -> Option<&LoadedActor> {
        match self {
            ActorState::Loaded(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut LoadedActor> {
        match self {
            ActorState::Loaded(loaded) => Some(loaded),
            _ => None,
        }
    }

    /// Feeds a loader outcome into the lifecycle. Returns whether the state changed.
    pub fn apply(&mut self, event: ModelLoadEvent) -> bool {
        if !self.is_unloaded() {
            debug!("ignoring model load event {event:?}, actor already settled");
            return false;
        }

        match event {
            ModelLoadEvent::Progress => false,
            ModelLoadEvent::Loaded(loaded) => {
                info!("actor loaded at {}", loaded.actor.position);
                *self = ActorState::Loaded(loaded);
                true
            }
            ModelLoadEvent::Failed(err) => {
                error!("model not loaded: {err}");
                *self = ActorState::Failed;
                true
            }
        }
    }
}
