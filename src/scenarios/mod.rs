//! Pre-built simulation scenarios.
//!
//! - Rod rolling or sliding on an inclined frictional plane

pub mod inclined_plane;

pub use inclined_plane::{
    check_alpha_s, FrictionParams, InclinedPlaneScenario, PlaneDescription, ScenarioParams,
    DEFAULT_GRAVITY, MAX_ALPHA_S,
};
