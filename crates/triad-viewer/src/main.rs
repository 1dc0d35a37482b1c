//! Triad Viewer entry point
//!
//! Usage: `triad-viewer [scene.ron]`
//!
//! Assembles the scene against the recording engine, logs every frame's
//! world pose and writes the registered geometry to stdout as JSON.

use std::path::PathBuf;

use serde::Serialize;
use triad_core::FrameGraph;
use triad_scene::{RecordingEngine, SceneAssembler, SceneConfig, SceneSnapshot, TriadRecord};

const DEFAULT_SCENE: &str = "demos/desk_scene.ron";

/// Everything published for one scene
#[derive(Debug, Serialize)]
struct Publication {
    scene: PathBuf,
    triads: Vec<TriadRecord>,
    snapshot: SceneSnapshot,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triad_viewer=info,triad_scene=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scene = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE));

    tracing::info!("Assembling scene {:?}", scene);

    let config = SceneConfig::load(&scene)?;
    let mut assembler = SceneAssembler::new(RecordingEngine::new());
    let triads = assembler.assemble(&config)?;

    let (graph, engine) = assembler.into_parts();
    log_world_poses(&graph)?;

    let publication = Publication {
        scene,
        triads,
        snapshot: engine.snapshot(),
    };
    serde_json::to_writer_pretty(std::io::stdout().lock(), &publication)?;
    println!();

    Ok(())
}

fn log_world_poses(graph: &FrameGraph) -> Result<(), triad_core::FrameGraphError> {
    for frame in graph.frames() {
        let pose = graph.world_pose(&frame.name)?;
        let (axis, angle) = pose.rotation().to_axis_angle();
        tracing::info!(
            "{:<28} p = [{:+.4}, {:+.4}, {:+.4}]  angle = {:+.4} about [{:+.3}, {:+.3}, {:+.3}]",
            frame.name,
            pose.translation().x,
            pose.translation().y,
            pose.translation().z,
            angle,
            axis.x,
            axis.y,
            axis.z
        );
    }
    Ok(())
}
