use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::gltf::Gltf;
use bevy::input::ButtonState;
use bevy::input::InputPlugin;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use fox_walk::SceneRuntime;
use fox_walk::assets::ActorModelPlugin;
use fox_walk::player::LocomotionPlugin;
use fox_walk::player::actor::ActorState;
use fox_walk::player::controller::PlayerRoot;
use fox_walk::runtime::RuntimePlugin;

fn app_loading(path: &'static str) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        AssetPlugin::default(),
        InputPlugin,
        RuntimePlugin,
        LocomotionPlugin,
        ActorModelPlugin { path },
    ));
    app.init_asset::<Gltf>();
    app.init_asset::<AnimationClip>();
    app
}

fn update_until_settled(app: &mut App) {
    for _ in 0..500 {
        app.update();
        if !app.world().resource::<SceneRuntime>().actor.is_unloaded() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("actor never left the unloaded state");
}

#[test]
fn missing_model_fails_and_ignores_input() {
    let mut app = app_loading("models/missing.gltf");
    update_until_settled(&mut app);
    assert!(matches!(
        app.world().resource::<SceneRuntime>().actor,
        ActorState::Failed
    ));

    app.world_mut().write_message(KeyboardInput {
        key_code: KeyCode::ArrowUp,
        logical_key: Key::ArrowUp,
        state: ButtonState::Pressed,
        text: None,
        repeat: false,
        window: Entity::PLACEHOLDER,
    });
    app.update();

    assert!(matches!(
        app.world().resource::<SceneRuntime>().actor,
        ActorState::Failed
    ));
    let world = app.world_mut();
    let mut roots = world.query_filtered::<Entity, With<PlayerRoot>>();
    assert_eq!(roots.iter(world).count(), 0);
}
