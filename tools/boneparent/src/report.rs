//! JSON report for the parent command

use anyhow::{Context, Result};
use boneparent_rig::{BoneAssignment, Scene};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct ParentReport {
    pub armature: String,
    pub assignments: Vec<AssignmentReport>,
    /// Resulting state of every affected mesh
    pub objects: Vec<ObjectReport>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentReport {
    pub object: String,
    pub bone: String,
    pub distance: f32,
    pub center: [f32; 3],
}

#[derive(Debug, Serialize)]
pub struct ObjectReport {
    pub name: String,
    pub parent: Option<String>,
    pub vertex_groups: Vec<GroupReport>,
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub weights: BTreeMap<usize, f32>,
}

impl ParentReport {
    /// Collect assignments and the post-parenting state of each assigned mesh
    pub fn new(armature: &str, scene: &Scene, assignments: &[BoneAssignment]) -> Self {
        let objects = assignments
            .iter()
            .filter_map(|a| scene.get(&a.object))
            .map(|object| ObjectReport {
                name: object.name.clone(),
                parent: object.parent.clone(),
                vertex_groups: object
                    .as_mesh()
                    .map(|mesh| {
                        mesh.vertex_groups
                            .iter()
                            .map(|g| GroupReport {
                                name: g.name.clone(),
                                weights: g.weights.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            armature: armature.to_string(),
            assignments: assignments
                .iter()
                .map(|a| AssignmentReport {
                    object: a.object.clone(),
                    bone: a.bone.clone(),
                    distance: a.distance,
                    center: a.center.to_array(),
                })
                .collect(),
            objects,
        }
    }
}

/// Write the report as pretty JSON to `output`, or to stdout when `None`
pub fn write_report(report: &ParentReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {:?}", path))?,
        None => println!("{}", json),
    }
    Ok(())
}
