//! boneparent - parent meshes to the nearest deforming bone
//!
//! Reads a scene file (scene.toml) describing armatures and meshes, and either
//! queries the nearest deforming bone or runs the single-bone parenting pass.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use boneparent::{parse_point, report, scene_file};
use boneparent_rig::{find_best_bone, parent_to_single_bone, ParentOptions, Vec3};

#[derive(Parser)]
#[command(name = "boneparent")]
#[command(about = "Parent meshes to the nearest deforming bone of an armature")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scene file
    Check {
        /// Path to scene.toml
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,
    },

    /// List an armature's bones in world space
    Bones {
        /// Path to scene.toml
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,

        /// Armature object (default: active object)
        #[arg(long)]
        object: Option<String>,
    },

    /// Find the deforming bone nearest to a point
    Nearest {
        /// Path to scene.toml
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,

        /// World-space query point as X,Y,Z
        #[arg(short, long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Vec3,

        /// Armature object (default: active object)
        #[arg(long)]
        object: Option<String>,
    },

    /// Parent selected meshes to the active armature, one bone each
    Parent {
        /// Path to scene.toml
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,

        /// Output JSON report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Weight assigned to every vertex in the chosen bone's group
        #[arg(short, long, default_value_t = 1.0)]
        weight: f32,

        /// Don't create empty vertex groups for the other bones
        #[arg(long)]
        no_empty_groups: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { scene } => {
            tracing::info!("Checking scene {:?}", scene);
            let file = scene_file::load_scene_file(&scene)?;
            scene_file::validate(&file)?;
            tracing::info!("Scene is valid!");
        }

        Commands::Bones { scene, object } => {
            let scene = scene_file::build_scene(&scene_file::load_scene_file(&scene)?)?;
            let armature = scene_file::resolve_armature(&scene, object.as_deref())?;
            let skeleton = armature.world_skeleton()?;

            println!("Bones in '{}':", armature.name);
            for (i, bone) in skeleton.bones().iter().enumerate() {
                println!(
                    "  [{}] '{}': head {:?} tail {:?}{}",
                    i,
                    bone.name,
                    bone.head.to_array(),
                    bone.tail.to_array(),
                    if bone.deform { "" } else { " (non-deforming)" }
                );
            }
        }

        Commands::Nearest {
            scene,
            point,
            object,
        } => {
            let scene = scene_file::build_scene(&scene_file::load_scene_file(&scene)?)?;
            let armature = scene_file::resolve_armature(&scene, object.as_deref())?;
            let (bone, distance) = find_best_bone(armature, point)
                .with_context(|| format!("No bone selected in '{}'", armature.name))?;
            println!("{}\t{}", bone.name, distance);
        }

        Commands::Parent {
            scene: scene_path,
            output,
            weight,
            no_empty_groups,
        } => {
            let mut scene = scene_file::build_scene(&scene_file::load_scene_file(&scene_path)?)?;
            let armature = scene_file::resolve_armature(&scene, None)?.name.clone();

            let options = ParentOptions {
                weight,
                empty_groups: !no_empty_groups,
            };
            let assignments = parent_to_single_bone(&mut scene, &options)
                .with_context(|| format!("Failed to parent meshes in {:?}", scene_path))?;
            if assignments.is_empty() {
                tracing::warn!("No selected meshes to parent");
            }

            let report = report::ParentReport::new(&armature, &scene, &assignments);
            report::write_report(&report, output.as_deref())?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
