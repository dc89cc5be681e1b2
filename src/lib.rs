pub mod assets;
pub mod camera;
pub mod frame;
pub mod game;
pub mod player;
pub mod runtime;

// Re-export commonly used items
pub use game::GamePlugin;
pub use runtime::SceneRuntime;
