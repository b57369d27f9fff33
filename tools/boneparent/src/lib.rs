//! boneparent library
//!
//! Scene file loading and report writing for the boneparent tool.

pub mod report;
pub mod scene_file;

use boneparent_rig::Vec3;

pub use report::{write_report, ParentReport};
pub use scene_file::{build_scene, load_scene_file, resolve_armature, validate, SceneFile};

/// Parse a point given as `X,Y,Z`
pub fn parse_point(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected X,Y,Z but got '{}'", s));
    }

    let mut coords = [0.0f32; 3];
    for (coord, part) in coords.iter_mut().zip(&parts) {
        *coord = part
            .parse()
            .map_err(|e| format!("invalid coordinate '{}': {}", part, e))?;
        if !coord.is_finite() {
            return Err(format!("coordinate '{}' is not finite", part));
        }
    }
    Ok(Vec3::from(coords))
}
