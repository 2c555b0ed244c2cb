pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod math;
pub mod scene;
pub mod scenes;
pub mod types;

pub use camera::Camera;
pub use error::{InitError, SkipReason};
pub use frame::FrameOutcome;
pub use scene::{Scene, SceneBuilder};
