//! Scene file parsing and validation
//!
//! Parses scene.toml and builds the in-memory rig scene from it.

use anyhow::{bail, Context, Result};
use boneparent_rig::{
    Armature, ArmatureBone, Bone, Mat4, Mesh, ObjectData, Quat, Scene, SceneObject, Skeleton,
    Vec3,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Root scene file structure
#[derive(Debug, Deserialize)]
pub struct SceneFile {
    /// Active object (defaults to the first armature)
    #[serde(default)]
    pub active: Option<String>,
    /// Selected objects (defaults to every mesh)
    #[serde(default)]
    pub selected: Option<Vec<String>>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Armature,
    Mesh,
    Empty,
}

#[derive(Debug, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion, xyzw
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Armature only
    #[serde(default)]
    pub bones: Vec<BoneEntry>,
    /// Mesh only, object-local positions
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl ObjectEntry {
    /// Local-to-world matrix from translation/rotation/scale
    pub fn world(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_array(self.rotation).normalize(),
            Vec3::from(self.translation),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    #[serde(default = "default_deform")]
    pub deform: bool,
}

fn default_deform() -> bool {
    true
}

/// Load and parse a scene file
pub fn load_scene_file(path: &Path) -> Result<SceneFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {:?}", path))?;
    parse_scene_file(&content).with_context(|| format!("Failed to parse scene: {:?}", path))
}

/// Parse scene TOML from a string
pub fn parse_scene_file(content: &str) -> Result<SceneFile> {
    Ok(toml::from_str(content)?)
}

/// Validate a scene file without building it
pub fn validate(file: &SceneFile) -> Result<()> {
    let mut names = HashSet::new();
    for object in &file.objects {
        if !names.insert(object.name.as_str()) {
            bail!("Duplicate object name '{}'", object.name);
        }

        let rotation = Quat::from_array(object.rotation);
        if !rotation.is_finite() || rotation.length_squared() == 0.0 {
            bail!("Object '{}' has an invalid rotation: {:?}", object.name, object.rotation);
        }
        if !Vec3::from(object.translation).is_finite() {
            bail!(
                "Object '{}' has a non-finite translation: {:?}",
                object.name,
                object.translation
            );
        }
        if !Vec3::from(object.scale).is_finite() {
            bail!("Object '{}' has a non-finite scale: {:?}", object.name, object.scale);
        }
        let bad_vertex = object
            .vertices
            .iter()
            .position(|&v| !Vec3::from(v).is_finite());
        if let Some(i) = bad_vertex {
            bail!(
                "Mesh '{}' has a non-finite vertex {}: {:?}",
                object.name,
                i,
                object.vertices[i]
            );
        }
        if !object.bones.is_empty() {
            local_skeleton(object)
                .validate()
                .with_context(|| format!("Armature '{}' has invalid bones", object.name))?;
        }

        if object.kind != ObjectKind::Armature && !object.bones.is_empty() {
            bail!("Object '{}' has bones but is not an armature", object.name);
        }
        if object.kind != ObjectKind::Mesh && !object.vertices.is_empty() {
            bail!("Object '{}' has vertices but is not a mesh", object.name);
        }
    }

    for object in &file.objects {
        if let Some(parent) = &object.parent {
            if !names.contains(parent.as_str()) {
                bail!("Object '{}' has unknown parent '{}'", object.name, parent);
            }
        }
    }

    if let Some(active) = &file.active {
        if !names.contains(active.as_str()) {
            bail!("Active object '{}' not found", active);
        }
    }
    for name in file.selected.iter().flatten() {
        if !names.contains(name.as_str()) {
            bail!("Selected object '{}' not found", name);
        }
    }

    Ok(())
}

/// Bones of an entry in armature-local space, for validation
fn local_skeleton(entry: &ObjectEntry) -> Skeleton {
    entry
        .bones
        .iter()
        .map(|b| {
            Bone::new(
                b.name.clone(),
                Vec3::from(b.head),
                Vec3::from(b.tail),
                b.deform,
            )
        })
        .collect()
}

/// Validate and convert a scene file into a rig scene
pub fn build_scene(file: &SceneFile) -> Result<Scene> {
    validate(file)?;

    let objects = file.objects.iter().map(build_object).collect();
    let mut scene = Scene::new(objects);

    scene.active = file.active.clone().or_else(|| {
        file.objects
            .iter()
            .find(|o| o.kind == ObjectKind::Armature)
            .map(|o| o.name.clone())
    });
    scene.selected = match &file.selected {
        Some(selected) => selected.clone(),
        None => file
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Mesh)
            .map(|o| o.name.clone())
            .collect(),
    };

    tracing::debug!(
        "Built scene: {} objects, active {:?}, {} selected",
        scene.objects.len(),
        scene.active,
        scene.selected.len()
    );

    Ok(scene)
}

fn build_object(entry: &ObjectEntry) -> SceneObject {
    let data = match entry.kind {
        ObjectKind::Armature => ObjectData::Armature(Armature::new(
            entry
                .bones
                .iter()
                .map(|b| {
                    ArmatureBone::new(
                        b.name.clone(),
                        Vec3::from(b.head),
                        Vec3::from(b.tail),
                        b.deform,
                    )
                })
                .collect(),
        )),
        ObjectKind::Mesh => {
            let vertices = entry.vertices.iter().map(|&v| Vec3::from(v)).collect();
            ObjectData::Mesh(Mesh::new(vertices))
        }
        ObjectKind::Empty => ObjectData::Empty,
    };

    let mut object = SceneObject::new(entry.name.clone(), entry.world(), data);
    object.parent = entry.parent.clone();
    object
}

/// Pick the armature to operate on: `name` if given, else the scene's active object
pub fn resolve_armature<'a>(scene: &'a Scene, name: Option<&str>) -> Result<&'a SceneObject> {
    let object = match name {
        Some(name) => scene
            .get(name)
            .with_context(|| format!("Object '{}' not found", name))?,
        None => scene
            .active_object()
            .context("No active object and no armature in scene")?,
    };

    if object.as_armature().is_none() {
        bail!("Expected armature, '{}' is {}", object.name, object.data.kind());
    }
    Ok(object)
}
