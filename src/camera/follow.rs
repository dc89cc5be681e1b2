use bevy::prelude::*;

/// Distance between the camera and the actor.
pub const CAMERA_OFFSET: Vec3 = Vec3::new(-4.0, 4.0, 7.0);

/// The camera that tracks the actor.
#[derive(Component, Default)]
pub struct FollowCamera;

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.target, Vec3::Y)
    }
}

/// Keeps the camera rigidly offset from the actor. No smoothing: the camera
/// jumps whenever the actor does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFollower {
    offset: Vec3,
}

impl Default for CameraFollower {
    fn default() -> Self {
        Self::new(CAMERA_OFFSET)
    }
}

impl CameraFollower {
    pub const fn new(offset: Vec3) -> Self {
        Self { offset }
    }

    pub fn follow(&self, model_position: Vec3) -> CameraPose {
        CameraPose {
            position: model_position + self.offset,
            target: model_position,
        }
    }
}
