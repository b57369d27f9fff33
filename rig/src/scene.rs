//! Minimal scene model: objects with world transforms, armatures, meshes

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::parenting::ParentError;
use crate::skeleton::{Bone, SelectError, Skeleton};

/// A bone in its armature's local space
#[derive(Debug, Clone, PartialEq)]
pub struct ArmatureBone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    pub deform: bool,
}

impl ArmatureBone {
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3, deform: bool) -> Self {
        Self {
            name: name.into(),
            head,
            tail,
            deform,
        }
    }
}

/// Armature data: an ordered list of local-space bones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Armature {
    pub bones: Vec<ArmatureBone>,
}

impl Armature {
    pub fn new(bones: Vec<ArmatureBone>) -> Self {
        Self { bones }
    }

    /// Transform every bone by `world`, keeping order, names and deform flags
    pub fn to_world(&self, world: Mat4) -> Skeleton {
        self.bones
            .iter()
            .map(|b| {
                Bone::new(
                    b.name.clone(),
                    world.transform_point3(b.head),
                    world.transform_point3(b.tail),
                    b.deform,
                )
            })
            .collect()
    }
}

/// Named per-vertex weights (sparse: unassigned vertices are absent)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexGroup {
    pub name: String,
    pub weights: BTreeMap<usize, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    pub fn weight(&self, vertex: usize) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    /// Assign `weight` to each vertex, overwriting previous values
    pub fn replace(&mut self, vertices: impl IntoIterator<Item = usize>, weight: f32) {
        for v in vertices {
            self.weights.insert(v, weight);
        }
    }
}

/// Mesh data: object-local vertex positions and vertex groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub vertex_groups: Vec<VertexGroup>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            vertex_groups: Vec::new(),
        }
    }

    pub fn vertex_group(&self, name: &str) -> Option<&VertexGroup> {
        self.vertex_groups.iter().find(|g| g.name == name)
    }

    /// Get the named group, appending an empty one if it doesn't exist
    pub fn ensure_vertex_group(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.vertex_groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.vertex_groups.push(VertexGroup::new(name));
                self.vertex_groups.len() - 1
            }
        };
        &mut self.vertex_groups[index]
    }

    /// Set every vertex of the mesh to `weight` in the named group
    pub fn set_vertex_group_weight(&mut self, group_name: &str, weight: f32) {
        let vertex_count = self.vertices.len();
        self.ensure_vertex_group(group_name).replace(0..vertex_count, weight);
    }
}

/// Per-kind object payload
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Armature(Armature),
    Mesh(Mesh),
    /// Any object without geometry we care about
    Empty,
}

impl ObjectData {
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectData::Armature(_) => "armature",
            ObjectData::Mesh(_) => "mesh",
            ObjectData::Empty => "empty",
        }
    }
}

/// A named object placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    /// Local-to-world transform
    pub world: Mat4,
    /// Name of the parent object, if any
    pub parent: Option<String>,
    pub data: ObjectData,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, world: Mat4, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            world,
            parent: None,
            data,
        }
    }

    pub fn armature(name: impl Into<String>, world: Mat4, armature: Armature) -> Self {
        Self::new(name, world, ObjectData::Armature(armature))
    }

    pub fn mesh(name: impl Into<String>, world: Mat4, mesh: Mesh) -> Self {
        Self::new(name, world, ObjectData::Mesh(mesh))
    }

    pub fn empty(name: impl Into<String>, world: Mat4) -> Self {
        Self::new(name, world, ObjectData::Empty)
    }

    pub fn as_armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// World-space origin of the object
    pub fn origin(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    /// Resolve the armature's bones into a world-space skeleton
    pub fn world_skeleton(&self) -> Result<Skeleton, SelectError> {
        let armature = self.as_armature().ok_or_else(|| {
            SelectError::InvalidInput(format!(
                "expected armature object, '{}' is {}",
                self.name,
                self.data.kind()
            ))
        })?;
        Ok(armature.to_world(self.world))
    }

    /// Mesh-only counterpart of [`Mesh::set_vertex_group_weight`]
    pub fn set_vertex_group_weight(
        &mut self,
        group_name: &str,
        weight: f32,
    ) -> Result<(), ParentError> {
        let name = self.name.clone();
        let mesh = self.as_mesh_mut().ok_or(ParentError::NotAMesh(name))?;
        mesh.set_vertex_group_weight(group_name, weight);
        Ok(())
    }
}

/// Ordered objects plus active/selected state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    /// Name of the active object
    pub active: Option<String>,
    /// Names of selected objects, in selection order
    pub selected: Vec<String>,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self {
            objects,
            active: None,
            selected: Vec::new(),
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.as_deref().and_then(|name| self.get(name))
    }

    /// Selected objects in selection order; unknown names are ignored
    pub fn selected_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.selected.iter().filter_map(|name| self.get(name))
    }
}
