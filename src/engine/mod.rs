pub mod audio_gate;
pub mod bow;
pub mod camera;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod model;
pub mod session;
pub mod song;

pub use audio_gate::{AudioGate, Playback, PlaybackState};
pub use bow::{BowMotion, BowPlacement, BowRect, CanvasRect, InstrumentLayout};
pub use camera::Camera;
pub use constants::*;
pub use error::EngineError;
pub use geometry::{Aabb, Plane, Ray};
pub use input::{Gesture, Motion, PointerTracker};
pub use model::{parse_glb, AlphaMode, MaterialData, MeshData, ModelData, TextureData};
pub use session::{BowSession, SceneStage, SessionParams};
pub use song::{ResolvedSong, SongEntry, SongRegistry};

// Shader bundled as a string constant
pub static SCENE_WGSL: &str = include_str!("../../shaders/scene.wgsl");
