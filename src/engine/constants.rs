// Interaction, layout and framing tuning constants.
// `SessionParams::default()` is built from these; the web glue reads the
// asset and page constants directly.

// Input debounce: pointer travel (CSS px) below this is treated as jitter
pub const MIN_MOTION_PX: f32 = 3.0;

// Audio pauses once a held pointer has been still for longer than this
pub const IDLE_PAUSE_MS: f64 = 160.0;

// Per-frame lerp factor of the visible bow toward its target
pub const BOW_SMOOTHING: f32 = 0.22;

// Bow plane sits this far in front (+Z) of the instrument center
pub const BOW_PLANE_OFFSET_Z: f32 = 0.2;

// Fraction of the instrument extent trimmed from each side of the bow rectangle
pub const BOW_BOUNDS_MARGIN: f32 = 0.10;

// Instrument placement
pub const INSTRUMENT_HEIGHT: f32 = 1.8; // world units after scaling
pub const INSTRUMENT_DROP: f32 = 0.2; // lowered below y = 0 to leave headroom
pub const MIN_MODEL_HEIGHT: f32 = 0.0001;

// Bow placement relative to the instrument
pub const BOW_SCALE_RATIO: f32 = 0.9;
pub const BOW_REST_HEIGHT: f32 = 0.55; // multiplier on (minY + maxY)

// Camera
pub const CAMERA_FOV_DEG: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_INITIAL_EYE: [f32; 3] = [0.0, 1.6, 3.0];
pub const FRAME_MARGIN: f32 = 1.15; // 1.0 = tight fit
pub const FRAME_ALIGN_Y: f32 = 0.01; // fraction of object height to raise the look point

// Scene colors (sRGB)
pub const BACKGROUND_SRGB: [f32; 3] = [0x2E as f32 / 255.0, 0x51 as f32 / 255.0, 0x5C as f32 / 255.0];
pub const GROUND_LIGHT_SRGB: [f32; 3] = [0x33 as f32 / 255.0, 0x33 as f32 / 255.0, 0x33 as f32 / 255.0];
pub const KEY_LIGHT_POSITION: [f32; 3] = [2.0, 3.0, 4.0];

// Canvas backing store never exceeds this device pixel ratio
pub const MAX_PIXEL_RATIO: f64 = 2.0;

// Page contract
pub const CANVAS_ID: &str = "gameCanvas";
pub const SONG_QUERY_PARAM: &str = "song";
pub const SONG_REGISTRY_GLOBAL: &str = "CANCIONES";
pub const DEFAULT_SONG_ID: &str = "1";
pub const MENU_PAGE: &str = "menu.html";
pub const SONG_NOT_FOUND_MESSAGE: &str = "Song not found. Returning to the menu.";

// Assets
pub const VIOLIN_MODEL_PATH: &str = "./src/3Dmodels/Violin/violin.glb";
pub const BOW_MODEL_PATH: &str = "./src/3Dmodels/Violin/violinBow.glb";
