use bevy::input::common_conditions::input_toggle_active;
use bevy::math::Affine2;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::assets::{SceneAssets, SceneAssetsPlugin, SceneStates};
use crate::camera::{CameraFollower, FollowCamera};
use crate::player::PlayerPlugin;
use crate::runtime::RuntimePlugin;

// #0088ff
const SKY: Color = Color::srgb(0.0, 136.0 / 255.0, 1.0);
const GROUND_SIZE: f32 = 160.0;
const GROUND_TEXTURE_REPEAT: f32 = 64.0;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SceneAssetsPlugin);
        app.add_plugins(RuntimePlugin);
        app.add_plugins(PlayerPlugin);

        // Debug panel, hidden until F1
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.add_plugins(EguiPlugin::default());
            app.add_plugins(
                WorldInspectorPlugin::new().run_if(input_toggle_active(false, KeyCode::F1)),
            );
        }

        app.insert_resource(ClearColor(SKY));
        app.add_systems(Startup, setup);
        app.add_systems(OnEnter(SceneStates::Ready), spawn_ground);
    }
}

/// Camera and lights. These need nothing from disk, so the frame loop has a camera from the first frame.
fn setup(mut commands: Commands, mut ambient_light: ResMut<AmbientLight>) {
    ambient_light.brightness = 400.0;

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY * 0.7,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        DistanceFog {
            color: SKY,
            falloff: FogFalloff::Linear {
                start: 10.0,
                end: 40.0,
            },
            ..default()
        },
        FollowCamera,
        CameraFollower::default().follow(Vec3::ZERO).transform(),
        Name::new("Camera"),
    ));
}

fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    assets: Option<Res<SceneAssets>>,
) {
    if assets.is_none() {
        warn!("ground texture unavailable, using a plain ground");
    }

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: assets.map(|a| a.ground.clone()),
            uv_transform: Affine2::from_scale(Vec2::splat(GROUND_TEXTURE_REPEAT)),
            metallic: 0.0,
            perceptual_roughness: 0.9,
            ..default()
        })),
        Name::new("Ground"),
    ));
}
