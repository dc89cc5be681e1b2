use std::sync::Arc;

use bevy::asset::{AssetLoadError, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use thiserror::Error;

use crate::player::actor::{Actor, ActorLoaded, LoadedActor, ModelLoadEvent};
use crate::player::animations::{ClipId, ClipLibrary, ClipSet};
use crate::runtime::{FrameSet, SceneRuntime};

pub const MODEL_PATH: &str = "models/Fox/glTF/Fox.gltf";

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum SceneStates {
    #[default]
    Loading,
    Ready,
}

/// Static scenery. The actor's model is loaded separately, see [`ActorModel`].
#[derive(Resource, AssetCollection)]
pub struct SceneAssets {
    #[asset(path = "textures/ground.png")]
    #[asset(image(sampler(filter = nearest, wrap = repeat)))]
    pub ground: Handle<Image>,
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("could not load {path}: {source}")]
    Asset {
        path: &'static str,
        #[source]
        source: Arc<AssetLoadError>,
    },
    #[error("{path} finished loading but is missing from the asset store")]
    Unavailable { path: &'static str },
    #[error("{path} has no scene")]
    MissingScene { path: &'static str },
    #[error("{path} has no animation {index} for the {clip} clip")]
    MissingClip {
        path: &'static str,
        index: usize,
        clip: ClipId,
    },
}

/// Handle to the actor's glTF while it streams in.
#[derive(Resource)]
pub struct ActorModel {
    pub path: &'static str,
    pub handle: Handle<Gltf>,
}

pub struct SceneAssetsPlugin;

impl Plugin for SceneAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SceneStates>()
            .add_loading_state(
                LoadingState::new(SceneStates::Loading)
                    .continue_to_state(SceneStates::Ready)
                    .on_failure_continue_to_state(SceneStates::Ready)
                    .load_collection::<SceneAssets>(),
            )
            .add_plugins(ActorModelPlugin::default());
    }
}

/// Streams the actor's model in and settles [`SceneRuntime::actor`] once it
/// is ready or has failed.
pub struct ActorModelPlugin {
    pub path: &'static str,
}

impl Default for ActorModelPlugin {
    fn default() -> Self {
        Self { path: MODEL_PATH }
    }
}

impl Plugin for ActorModelPlugin {
    fn build(&self, app: &mut App) {
        let path = self.path;
        app.add_systems(
            Startup,
            move |mut commands: Commands, asset_server: Res<AssetServer>| {
                commands.insert_resource(ActorModel {
                    path,
                    handle: asset_server.load(path),
                });
            },
        )
        .add_systems(
            Update,
            poll_actor_model
                .before(FrameSet::Input)
                .run_if(actor_unloaded.and(resource_exists::<ActorModel>)),
        );
    }
}

fn actor_unloaded(runtime: Res<SceneRuntime>) -> bool {
    runtime.actor.is_unloaded()
}

fn poll_actor_model(
    mut commands: Commands,
    model: Res<ActorModel>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    clips: Res<Assets<AnimationClip>>,
    mut runtime: ResMut<SceneRuntime>,
    mut reported: Local<bool>,
) {
    match asset_server.recursive_dependency_load_state(&model.handle) {
        RecursiveDependencyLoadState::NotLoaded | RecursiveDependencyLoadState::Loading => {
            if !*reported {
                debug!("model loading");
                *reported = true;
            }
            runtime.actor.apply(ModelLoadEvent::Progress);
        }
        RecursiveDependencyLoadState::Loaded => match prepare_actor(model.path, &model.handle, &gltfs, &clips) {
            Ok((loaded, spawn)) => {
                if runtime.actor.apply(ModelLoadEvent::Loaded(loaded)) {
                    commands.trigger(spawn);
                }
            }
            Err(err) => {
                runtime.actor.apply(ModelLoadEvent::Failed(err));
            }
        },
        RecursiveDependencyLoadState::Failed(source) => {
            runtime.actor.apply(ModelLoadEvent::Failed(ModelLoadError::Asset {
                path: model.path,
                source,
            }));
        }
    }
}

fn prepare_actor(
    path: &'static str,
    handle: &Handle<Gltf>,
    gltfs: &Assets<Gltf>,
    clips: &Assets<AnimationClip>,
) -> Result<(LoadedActor, ActorLoaded), ModelLoadError> {
    let gltf = gltfs.get(handle).ok_or(ModelLoadError::Unavailable { path })?;
    bind_actor(path, &gltf.scenes, &gltf.animations, clips)
}

/// Binds scene 0 and animations 0..3 of the model to the actor.
fn bind_actor(
    path: &'static str,
    scenes: &[Handle<Scene>],
    animations: &[Handle<AnimationClip>],
    clips: &Assets<AnimationClip>,
) -> Result<(LoadedActor, ActorLoaded), ModelLoadError> {
    let scene = scenes
        .first()
        .cloned()
        .ok_or(ModelLoadError::MissingScene { path })?;

    let missing = |clip: ClipId| ModelLoadError::MissingClip {
        path,
        index: clip.asset_index(),
        clip,
    };
    let handles = ClipSet::try_from_fn(|id| {
        animations
            .get(id.asset_index())
            .cloned()
            .ok_or_else(|| missing(id))
    })?;
    let durations = ClipSet::try_from_fn(|id| {
        clips
            .get(handles.get(id))
            .map(AnimationClip::duration)
            .ok_or_else(|| missing(id))
    })?;

    let actor = Actor::default();
    let spawn = ActorLoaded {
        transform: actor.transform(),
        scene,
        clips: handles,
    };
    Ok((LoadedActor::new(actor, ClipLibrary::new(durations)), spawn))
}
