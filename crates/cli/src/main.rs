use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sightline::api::{draw_scene, Algorithm, RandomSceneCfg, ReplayToken, TARGET_ID, VIEWER_ID};
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod scene_file;

use scene_file::{QuerySpec, SceneFile};

#[derive(Parser)]
#[command(name = "sightline")]
#[command(about = "Line-of-sight and percent-visible queries over JSON scenes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Evaluate every query of a scene file and print JSON results
    Eval {
        #[arg(long)]
        scene: PathBuf,
        /// Override the file's algorithm (geometric, points, per-pixel)
        #[arg(long)]
        algorithm: Option<String>,
    },
    /// Print a reproducible random scene file
    Random {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long)]
        walls: Option<usize>,
    },
    /// Print version information as JSON
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Eval { scene, algorithm } => eval(scene, algorithm),
        Action::Random { seed, index, walls } => random(seed, index, walls),
        Action::Report => report(),
    }
}

fn eval(path: PathBuf, algorithm: Option<String>) -> Result<()> {
    let file = SceneFile::load(&path)?;
    let mut config = file.effective_config();
    if let Some(a) = algorithm {
        config.algorithm = Algorithm::from(a);
    }
    tracing::info!(
        scene = %path.display(),
        queries = file.queries.len(),
        algorithm = ?config.algorithm,
        "eval"
    );
    let outcomes = file
        .queries
        .iter()
        .map(|q| file.evaluate(q, &config))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

fn random(seed: u64, index: u64, walls: Option<usize>) -> Result<()> {
    let mut cfg = RandomSceneCfg::default();
    if let Some(w) = walls {
        cfg.walls = w;
    }
    tracing::info!(seed, index, walls = cfg.walls, "random");
    let scene = draw_scene(cfg, ReplayToken::new(seed, index));
    let file = SceneFile {
        scene,
        queries: vec![QuerySpec {
            viewer: Some(VIEWER_ID),
            target: TARGET_ID,
            viewpoints: None,
            target_location: None,
        }],
        ..SceneFile::default()
    };
    let text = serde_json::to_string_pretty(&file).context("serializing scene")?;
    println!("{text}");
    Ok(())
}

fn report() -> Result<()> {
    let rev = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let obj = serde_json::json!({
        "code_rev": rev,
        "version": sightline::VERSION,
        "algorithms": ["geometric", "points", "per-pixel"],
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
