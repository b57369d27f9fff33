//! boneparent-rig
//!
//! Geometry and rig model behind the "parent to single bone" operation:
//! point-to-segment distances, nearest deforming bone selection, a small
//! scene model (armatures, meshes, vertex groups) and the parenting workflow
//! that ties them together.

pub mod geometry;
pub mod parenting;
pub mod scene;
pub mod skeleton;

pub use geometry::{center_of_mass, distance_point_to_segment, mean_or};
pub use parenting::{parent_to_single_bone, BoneAssignment, ParentError, ParentOptions};
pub use scene::{Armature, ArmatureBone, Mesh, ObjectData, Scene, SceneObject, VertexGroup};
pub use skeleton::{
    find_best_bone, nearest_deforming_bone, select_nearest_deforming_bone, Bone, NearestBone,
    SelectError, Skeleton,
};

// Re-export the math types used throughout the public API
pub use glam::{Mat4, Quat, Vec3};
