//! World-space skeletons and nearest deforming bone selection

use std::collections::HashSet;

use glam::Vec3;

use crate::geometry::distance_point_to_segment;
use crate::scene::SceneObject;

/// Selection error
///
/// Both kinds describe the caller's data, so retrying the same call never helps.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectError {
    /// Skeleton container is empty, malformed, or not an armature at all
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No bone in the skeleton has its deform flag set
    #[error("expected at least one deforming bone")]
    NoDeformingBone,
}

/// A rigid bone segment in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Unique within its skeleton
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    /// Whether the bone contributes to mesh deformation
    pub deform: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3, deform: bool) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            deform,
        }
    }

    /// Distance from `point` to this bone's head→tail segment
    pub fn distance_to(&self, point: Vec3) -> f32 {
        distance_point_to_segment(point, self.head, self.tail)
    }
}

/// Ordered bone collection, already resolved to world space
///
/// Iteration order is the construction order and decides exact ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Look up a bone by name
    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Number of bones with the deform flag set
    pub fn deforming_count(&self) -> usize {
        self.bones.iter().filter(|b| b.deform).count()
    }

    /// Check the container is usable for selection
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::InvalidInput`] if:
    /// - the skeleton has no bones
    /// - two bones share a name
    /// - any head or tail coordinate is NaN or infinite
    pub fn validate(&self) -> Result<(), SelectError> {
        if self.bones.is_empty() {
            return Err(SelectError::InvalidInput("skeleton has no bones".into()));
        }

        let mut names = HashSet::with_capacity(self.bones.len());
        for bone in &self.bones {
            if !names.insert(bone.name.as_str()) {
                return Err(SelectError::InvalidInput(format!(
                    "duplicate bone name '{}'",
                    bone.name
                )));
            }
            if !bone.head.is_finite() || !bone.tail.is_finite() {
                return Err(SelectError::InvalidInput(format!(
                    "bone '{}' has non-finite coordinates",
                    bone.name
                )));
            }
        }

        Ok(())
    }
}

impl FromIterator<Bone> for Skeleton {
    fn from_iter<I: IntoIterator<Item = Bone>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A selected bone together with its segment distance to the query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestBone<'a> {
    pub bone: &'a Bone,
    pub distance: f32,
}

/// Find the deforming bone closest to `point`, with its distance
///
/// Non-deforming bones are ignored. The running minimum is replaced only on a
/// strictly smaller distance, so the first bone wins exact ties. A non-finite
/// query point is rejected, since no distance to it can be compared.
pub fn nearest_deforming_bone(
    skeleton: &Skeleton,
    point: Vec3,
) -> Result<NearestBone<'_>, SelectError> {
    skeleton.validate()?;
    if !point.is_finite() {
        return Err(SelectError::InvalidInput(format!(
            "query point {:?} is not finite",
            point
        )));
    }

    let mut best: Option<NearestBone<'_>> = None;
    for bone in skeleton.bones.iter().filter(|b| b.deform) {
        let distance = bone.distance_to(point);
        tracing::trace!("bone '{}' at distance {}", bone.name, distance);

        if best.is_none_or(|current| distance < current.distance) {
            best = Some(NearestBone { bone, distance });
        }
    }

    let best = best.ok_or(SelectError::NoDeformingBone)?;
    tracing::debug!(
        "nearest deforming bone to {:?}: '{}' ({})",
        point,
        best.bone.name,
        best.distance
    );
    Ok(best)
}

/// Select the deforming bone whose segment is closest to `point`
///
/// # Errors
///
/// - [`SelectError::InvalidInput`] for an empty or malformed skeleton
/// - [`SelectError::NoDeformingBone`] when no bone deforms
pub fn select_nearest_deforming_bone(
    skeleton: &Skeleton,
    point: Vec3,
) -> Result<&Bone, SelectError> {
    nearest_deforming_bone(skeleton, point).map(|nearest| nearest.bone)
}

/// Resolve an armature object to world space and pick its nearest deforming bone
///
/// Returns the chosen bone (in world space) and its distance to `position`.
pub fn find_best_bone(armature: &SceneObject, position: Vec3) -> Result<(Bone, f32), SelectError> {
    let skeleton = armature.world_skeleton()?;
    let nearest = nearest_deforming_bone(&skeleton, position)?;
    Ok((nearest.bone.clone(), nearest.distance))
}
