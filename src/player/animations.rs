use bevy::prelude::*;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::player::actor::ActorLoaded;
use crate::player::controller::PlayerRoot;
use crate::runtime::{FrameSet, SceneRuntime};

/// The clips shipped with the fox model, in asset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ClipId {
    LookAround,
    Walk,
    // Nothing triggers this one yet
    Run,
}

impl ClipId {
    /// Index of the clip among the model's animations.
    pub const fn asset_index(self) -> usize {
        match self {
            ClipId::LookAround => 0,
            ClipId::Walk => 1,
            ClipId::Run => 2,
        }
    }
}

/// One `T` per clip.
#[derive(Debug, Default, Clone, PartialEq, Component)]
pub struct ClipSet<T> {
    look_around: T,
    walk: T,
    run: T,
}

impl<T> ClipSet<T> {
    pub fn try_from_fn<E>(mut f: impl FnMut(ClipId) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            look_around: f(ClipId::LookAround)?,
            walk: f(ClipId::Walk)?,
            run: f(ClipId::Run)?,
        })
    }

    pub fn from_fn(mut f: impl FnMut(ClipId) -> T) -> Self {
        Self {
            look_around: f(ClipId::LookAround),
            walk: f(ClipId::Walk),
            run: f(ClipId::Run),
        }
    }

    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(|_| value.clone())
    }

    pub const fn get(&self, id: ClipId) -> &T {
        match id {
            ClipId::LookAround => &self.look_around,
            ClipId::Walk => &self.walk,
            ClipId::Run => &self.run,
        }
    }

    pub fn get_mut(&mut self, id: ClipId) -> &mut T {
        match id {
            ClipId::LookAround => &mut self.look_around,
            ClipId::Walk => &mut self.walk,
            ClipId::Run => &mut self.run,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClipId, &T)> {
        ClipId::iter().map(|id| (id, self.get(id)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipState {
    pub duration: f32,
    pub active: bool,
    pub playhead: f32,
}

impl ClipState {
    fn new(duration: f32) -> Self {
        Self {
            duration,
            active: false,
            playhead: 0.0,
        }
    }
}

/// Play state of every clip bound to the actor.
///
/// Starting and stopping are idempotent; a restart after `stop` plays from the beginning.
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    clips: ClipSet<ClipState>,
}

impl ClipLibrary {
    pub fn new(durations: ClipSet<f32>) -> Self {
        Self {
            clips: ClipSet::from_fn(|id| ClipState::new(*durations.get(id))),
        }
    }

    pub fn start(&mut self, id: ClipId) {
        let clip = self.clips.get_mut(id);
        if !clip.active {
            clip.active = true;
            clip.playhead = 0.0;
        }
    }

    pub fn stop(&mut self, id: ClipId) {
        let clip = self.clips.get_mut(id);
        clip.active = false;
        clip.playhead = 0.0;
    }

    pub fn is_active(&self, id: ClipId) -> bool {
        self.clips.get(id).active
    }

    pub fn clip(&self, id: ClipId) -> &ClipState {
        self.clips.get(id)
    }

    /// Steps every active clip, looping at its duration.
    pub fn advance(&mut self, delta: f32) {
        if !(delta.is_finite() && delta > 0.0) {
            return;
        }

        for id in ClipId::iter() {
            let clip = self.clips.get_mut(id);
            if !clip.active {
                continue;
            }
            clip.playhead = if clip.duration > 0.0 {
                (clip.playhead + delta).rem_euclid(clip.duration)
            } else {
                0.0
            };
        }
    }
}

/// Clip handles of the loaded model, kept around until its animation player shows up.
#[derive(Resource)]
pub struct ActorAnimations(pub ClipSet<Handle<AnimationClip>>);

/// Marks the `AnimationPlayer` inside the actor's scene.
#[derive(Component)]
pub struct ClipPlayerOf(pub Entity);

pub struct ClipPlaybackPlugin;

impl Plugin for ClipPlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(store_actor_animations);
        app.add_observer(on_clip_player_linked);
        app.add_systems(PreUpdate, link_clip_players);
        app.add_systems(Update, sync_clip_playback.in_set(FrameSet::Present));
    }
}

fn store_actor_animations(on: On<ActorLoaded>, mut commands: Commands) {
    commands.insert_resource(ActorAnimations(on.event().clips.clone()));
}

fn link_clip_players(
    mut commands: Commands,
    added: Query<Entity, Added<AnimationPlayer>>,
    roots: Query<Entity, With<PlayerRoot>>,
    parents: Query<&ChildOf>,
) {
    for player in added.iter() {
        let Some(root) = parents
            .iter_ancestors(player)
            .find_map(|e| roots.get(e).ok())
        else {
            continue;
        };

        commands.entity(player).insert(ClipPlayerOf(root));
    }
}

fn on_clip_player_linked(
    on: On<Add, ClipPlayerOf>,
    animations: Option<Res<ActorAnimations>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut commands: Commands,
) {
    let Some(animations) = animations else {
        warn!("animation player linked before the actor's clips were stored");
        return;
    };

    let mut graph = AnimationGraph::new();
    let root = graph.root;
    let nodes = ClipSet::from_fn(|id| graph.add_clip(animations.0.get(id).clone(), 1.0, root));

    commands
        .entity(on.event_target())
        .insert(AnimationGraphHandle(graphs.add(graph)))
        .insert(nodes);
}

/// Mirrors the clip library onto Bevy's animation player. The library owns the
/// timing, so active clips are kept paused at its playhead.
fn sync_clip_playback(
    runtime: Res<SceneRuntime>,
    mut players: Query<(&mut AnimationPlayer, &ClipSet<AnimationNodeIndex>)>,
) {
    let Some(loaded) = runtime.actor.loaded() else {
        return;
    };

    for (mut player, nodes) in players.iter_mut() {
        for (id, &node) in nodes.iter() {
            let clip = loaded.clips.clip(id);
            if clip.active {
                player.play(node).pause().set_seek_time(clip.playhead);
            } else if player.is_playing_animation(node) {
                player.stop(node);
            }
        }
    }
}
