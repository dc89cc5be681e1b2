use bevy::input::ButtonState;
use bevy::input::keyboard::KeyboardInput;
use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;
use strum_macros::Display;

use crate::player::actor::{ActorLoaded, ActorState, Heading, LoadedActor};
use crate::player::animations::ClipId;
use crate::runtime::SceneRuntime;

#[derive(Component, Default)]
#[require(Transform, Visibility)]
pub struct PlayerRoot;

/// What a key does to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    LookAround,
}

impl InputAction {
    pub const fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp => Some(InputAction::MoveUp),
            KeyCode::ArrowDown => Some(InputAction::MoveDown),
            KeyCode::ArrowRight => Some(InputAction::MoveRight),
            KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
            KeyCode::Space => Some(InputAction::LookAround),
            _ => None,
        }
    }

    /// Heading and world-space step direction of a movement action.
    ///
    /// The axes are fixed: the actor turns to face them but never moves along its own facing.
    pub const fn movement(self) -> Option<(Heading, Vec3)> {
        match self {
            InputAction::MoveUp => Some((Heading::North, Vec3::NEG_Z)),
            InputAction::MoveDown => Some((Heading::South, Vec3::Z)),
            InputAction::MoveRight => Some((Heading::East, Vec3::X)),
            InputAction::MoveLeft => Some((Heading::West, Vec3::NEG_X)),
            InputAction::LookAround => None,
        }
    }

    const fn clip(self) -> ClipId {
        match self {
            InputAction::LookAround => ClipId::LookAround,
            _ => ClipId::Walk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionSettings {
    /// Distance covered per key press, including key repeats.
    pub walking_speed: f32,
    pub running_speed: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            walking_speed: 0.1,
            running_speed: 0.3,
        }
    }
}

/// Turns key presses into heading, position and clip changes on the actor.
///
/// Every key is handled on its own: releasing any arrow stops the walk even
/// while another arrow is still held.
#[derive(Debug, Default, Clone)]
pub struct LocomotionController {
    pub settings: LocomotionSettings,
}

impl LocomotionController {
    pub fn new(settings: LocomotionSettings) -> Self {
        Self { settings }
    }

    pub fn key_down(&self, key: KeyCode, actor: &mut ActorState) -> Option<InputAction> {
        let action = InputAction::from_key(key)?;
        let ActorState::Loaded(loaded) = actor else {
            trace!("ignoring {action}, no actor");
            return Some(action);
        };

        self.press(action, loaded);
        Some(action)
    }

    pub fn key_up(&self, key: KeyCode, actor: &mut ActorState) -> Option<InputAction> {
        let action = InputAction::from_key(key)?;
        if let ActorState::Loaded(loaded) = actor {
            loaded.clips.stop(action.clip());
        }
        Some(action)
    }

    fn press(&self, action: InputAction, loaded: &mut LoadedActor) {
        if let Some((heading, direction)) = action.movement() {
            let actor = &mut loaded.actor;
            if actor.heading != heading {
                actor.heading = heading;
            }
            actor.position += direction * self.settings.walking_speed;
        }

        loaded.clips.start(action.clip());
    }
}

/// Feeds raw keyboard messages into the runtime. Repeats count as presses.
pub fn handle_key_events(
    mut keys: MessageReader<KeyboardInput>,
    mut runtime: ResMut<SceneRuntime>,
) {
    for key in keys.read() {
        let action = match key.state {
            ButtonState::Pressed => runtime.key_down(key.key_code),
            ButtonState::Released => runtime.key_up(key.key_code),
        };

        if let Some(action) = action {
            trace!("{action} {:?}", key.state);
        }
    }
}

pub fn on_actor_loaded(on: On<ActorLoaded>, mut commands: Commands) {
    let loaded = on.event();
    commands.spawn((
        PlayerRoot,
        Name::new("Fox"),
        loaded.transform,
        children![SceneRoot(loaded.scene.clone())],
    ));
}

/// Copies the world transform of whatever the actor's entity hangs off into
/// the runtime, so the frame tick sees the actor's true world position.
pub fn sync_actor_parent(
    mut runtime: ResMut<SceneRuntime>,
    roots: Query<Option<&ChildOf>, With<PlayerRoot>>,
    transforms: TransformHelper,
) {
    let Ok(child_of) = roots.single() else {
        return;
    };
    let parent = match child_of {
        Some(child_of) => match transforms.compute_global_transform(child_of.parent()) {
            Ok(global) => global,
            Err(err) => {
                warn!("could not resolve the actor's parent transform: {err}");
                return;
            }
        },
        None => GlobalTransform::IDENTITY,
    };

    if let Some(loaded) = runtime.actor.loaded_mut()
        && loaded.actor.parent != parent
    {
        loaded.actor.parent = parent;
    }
}

pub fn sync_actor_transform(
    runtime: Res<SceneRuntime>,
    mut roots: Query<&mut Transform, With<PlayerRoot>>,
) {
    let Some(loaded) = runtime.actor.loaded() else {
        return;
    };

    let target = loaded.actor.transform();
    for mut transform in roots.iter_mut() {
        if *transform != target {
            *transform = target;
        }
    }
}
