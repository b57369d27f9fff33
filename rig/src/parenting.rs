//! Parent meshes to an armature, each bound to its nearest deforming bone
//!
//! Every selected mesh is parented to the active armature, gets an empty
//! vertex group per bone, and has all of its vertices weighted to the bone
//! closest to its center of mass.

use glam::Vec3;

use crate::geometry::center_of_mass;
use crate::scene::Scene;
use crate::skeleton::{nearest_deforming_bone, SelectError};

/// Errors from the parenting workflow
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParentError {
    #[error("no active object")]
    NoActiveObject,

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("expected mesh, '{0}' is not a mesh")]
    NotAMesh(String),

    #[error("invalid weight {0} (must be within 0.0..=1.0)")]
    InvalidWeight(f32),
}

/// Options for [`parent_to_single_bone`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentOptions {
    /// Weight written into the chosen bone's vertex group
    pub weight: f32,
    /// Create an empty vertex group for every armature bone
    pub empty_groups: bool,
}

impl Default for ParentOptions {
    fn default() -> Self {
        Self {
            weight: 1.0,
            empty_groups: true,
        }
    }
}

/// Outcome for one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct BoneAssignment {
    /// Mesh object name
    pub object: String,
    /// Chosen bone (also the vertex group name)
    pub bone: String,
    /// Distance from the mesh center to the bone segment
    pub distance: f32,
    /// World-space center of mass used as the query point
    pub center: Vec3,
}

/// Parent every selected mesh to the active armature, one bone per mesh
///
/// All bone choices are made before the scene is touched, so any error leaves
/// the scene exactly as it was. Selected objects that aren't meshes, and the
/// armature itself, are skipped.
pub fn parent_to_single_bone(
    scene: &mut Scene,
    options: &ParentOptions,
) -> Result<Vec<BoneAssignment>, ParentError> {
    if !(0.0..=1.0).contains(&options.weight) {
        return Err(ParentError::InvalidWeight(options.weight));
    }

    let armature = scene.active_object().ok_or(ParentError::NoActiveObject)?;
    let skeleton = armature.world_skeleton()?;
    let armature_name = armature.name.clone();

    let mut assignments = Vec::new();
    for object in scene.selected_objects() {
        if object.name == armature_name {
            continue;
        }
        let Some(mesh) = object.as_mesh() else {
            tracing::debug!("skipping '{}' ({})", object.name, object.data.kind());
            continue;
        };

        let center = center_of_mass(&mesh.vertices, object.world);
        let nearest = nearest_deforming_bone(&skeleton, center)?;
        assignments.push(BoneAssignment {
            object: object.name.clone(),
            bone: nearest.bone.name.clone(),
            distance: nearest.distance,
            center,
        });
    }

    for assignment in &assignments {
        let Some(object) = scene.get_mut(&assignment.object) else {
            continue;
        };
        object.parent = Some(armature_name.clone());

        let Some(mesh) = object.as_mesh_mut() else {
            continue;
        };
        if options.empty_groups {
            for bone in skeleton.bones() {
                mesh.ensure_vertex_group(&bone.name);
            }
        }
        mesh.set_vertex_group_weight(&assignment.bone, options.weight);

        tracing::info!(
            "Parented '{}' to '{}' via bone '{}'",
            assignment.object,
            armature_name,
            assignment.bone
        );
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Armature, ArmatureBone, Mesh, SceneObject};
    use glam::Mat4;

    fn two_bone_armature() -> SceneObject {
        SceneObject::armature(
            "Armature",
            Mat4::IDENTITY,
            Armature::new(vec![
                ArmatureBone::new("left", Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), true),
                ArmatureBone::new(
                    "right",
                    Vec3::new(10.0, 0.0, 0.0),
                    Vec3::new(10.0, 0.0, 1.0),
                    true,
                ),
                ArmatureBone::new(
                    "root",
                    Vec3::new(5.0, 0.0, 0.0),
                    Vec3::new(5.0, 0.0, 1.0),
                    false,
                ),
            ]),
        )
    }

    fn cube_at(name: &str, translation: Vec3) -> SceneObject {
        let vertices = vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 1.0),
            Vec3::new(-0.5, 0.5, 1.0),
        ];
        SceneObject::mesh(name, Mat4::from_translation(translation), Mesh::new(vertices))
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(vec![
            two_bone_armature(),
            cube_at("Hand.L", Vec3::new(0.2, 0.0, 0.0)),
            cube_at("Hand.R", Vec3::new(9.5, 0.0, 0.0)),
            SceneObject::empty("Camera", Mat4::IDENTITY),
        ]);
        scene.active = Some("Armature".into());
        scene.selected = vec![
            "Armature".into(),
            "Hand.L".into(),
            "Camera".into(),
            "Hand.R".into(),
        ];
        scene
    }

    #[test]
    fn test_assigns_each_mesh_to_its_nearest_bone() {
        let mut scene = scene();
        let assignments = parent_to_single_bone(&mut scene, &ParentOptions::default()).unwrap();

        let pairs: Vec<_> = assignments
            .iter()
            .map(|a| (a.object.as_str(), a.bone.as_str()))
            .collect();
        assert_eq!(pairs, [("Hand.L", "left"), ("Hand.R", "right")]);
        assert!(assignments[0].center.abs_diff_eq(Vec3::new(0.2, 0.0, 0.5), 1e-5));
    }

    #[test]
    fn test_mutates_parent_and_vertex_groups() {
        let mut scene = scene();
        parent_to_single_bone(&mut scene, &ParentOptions::default()).unwrap();

        let hand = scene.get("Hand.R").unwrap();
        assert_eq!(hand.parent.as_deref(), Some("Armature"));

        let mesh = hand.as_mesh().unwrap();
        let names: Vec<_> = mesh.vertex_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["left", "right", "root"]);
        assert!(mesh.vertex_group("left").unwrap().weights.is_empty());

        let right = mesh.vertex_group("right").unwrap();
        assert_eq!(right.weights.len(), 4);
        assert!(right.weights.values().all(|&w| w == 1.0));

        // Camera is selected but isn't a mesh
        assert_eq!(scene.get("Camera").unwrap().parent, None);
        assert_eq!(scene.get("Armature").unwrap().parent, None);
    }

    #[test]
    fn test_custom_weight_without_empty_groups() {
        let mut scene = scene();
        let options = ParentOptions {
            weight: 0.5,
            empty_groups: false,
        };
        parent_to_single_bone(&mut scene, &options).unwrap();

        let mesh = scene.get("Hand.L").unwrap().as_mesh().unwrap();
        assert_eq!(mesh.vertex_groups.len(), 1);
        assert!(mesh.vertex_group("left").unwrap().weights.values().all(|&w| w == 0.5));
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let mut scene = scene();
        let options = ParentOptions {
            weight: 1.5,
            ..Default::default()
        };
        assert_eq!(
            parent_to_single_bone(&mut scene, &options),
            Err(ParentError::InvalidWeight(1.5))
        );
    }

    #[test]
    fn test_requires_active_object() {
        let mut scene = scene();
        scene.active = None;
        assert_eq!(
            parent_to_single_bone(&mut scene, &ParentOptions::default()),
            Err(ParentError::NoActiveObject)
        );
    }

    #[test]
    fn test_active_object_must_be_armature() {
        let mut scene = scene();
        scene.active = Some("Hand.L".into());
        let result = parent_to_single_bone(&mut scene, &ParentOptions::default());
        assert!(matches!(
            result,
            Err(ParentError::Select(SelectError::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_non_finite_vertex_is_rejected() {
        let mut scene = scene();
        scene.objects.push(SceneObject::mesh(
            "Broken",
            Mat4::IDENTITY,
            Mesh::new(vec![Vec3::new(f32::NAN, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.5)]),
        ));
        scene.selected.push("Broken".into());
        let before = scene.clone();

        let result = parent_to_single_bone(&mut scene, &ParentOptions::default());
        assert!(matches!(
            result,
            Err(ParentError::Select(SelectError::InvalidInput(_)))
        ));
        // NaN != NaN, so compare the untouched objects field by field
        assert_eq!(scene.get("Hand.L"), before.get("Hand.L"));
        assert!(scene.objects.iter().all(|o| o.parent.is_none()));
    }

    #[test]
    fn test_failure_leaves_scene_untouched() {
        let mut scene = scene();
        if let Some(armature) = scene.get_mut("Armature") {
            armature.data = crate::scene::ObjectData::Armature(Armature::new(vec![
                ArmatureBone::new("ctrl", Vec3::ZERO, Vec3::Z, false),
            ]));
        }
        let before = scene.clone();

        let result = parent_to_single_bone(&mut scene, &ParentOptions::default());
        assert_eq!(result, Err(ParentError::Select(SelectError::NoDeformingBone)));
        assert_eq!(scene, before);
    }

    #[test]
    fn test_empty_mesh_uses_object_origin() {
        let mut scene = scene();
        scene.objects.push(SceneObject::mesh(
            "Marker",
            Mat4::from_translation(Vec3::new(11.0, 0.0, 0.5)),
            Mesh::default(),
        ));
        scene.selected = vec!["Marker".into()];

        let assignments = parent_to_single_bone(&mut scene, &ParentOptions::default()).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].bone, "right");
        assert!((assignments[0].distance - 1.0).abs() < 1e-5);
    }
}
