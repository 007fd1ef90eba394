use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use subdiv_cbt::NodeId;
use subdiv_common::{LodConfig, RegionHandle, derive_key_with};
use subdiv_leb::{
    Domain, Neighbors, Triangle, decode_in, footprint_radius_in, locate_brute_force, neighbors_in,
};
use subdiv_occupancy::SubdivisionLod;

#[derive(Parser)]
#[command(name = "subdiv-cli", about = "CLI tool for the subdivision LOD index")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML file with LOD settings (default_depth, extents, slab_height)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Derive the region key for a region handle and height
    Key {
        /// Region handle, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_handle)]
        handle: u64,
        /// World z coordinate
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Decode a node id into its triangle
    Decode {
        id: u64,
        #[arg(long, value_enum, default_value = "square")]
        domain: DomainArg,
    },
    /// List the same-depth neighbors of a node id
    Neighbors {
        id: u64,
        #[arg(long, value_enum, default_value = "square")]
        domain: DomainArg,
    },
    /// Find the node containing a point
    Locate {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        /// Tree depth (defaults to the configured depth)
        #[arg(short, long)]
        depth: Option<u32>,
        /// Use the exhaustive scan instead of the descent
        #[arg(long)]
        brute_force: bool,
    },
    /// Move objects around one region and report occupancy
    Demo {
        /// Number of objects to track
        #[arg(short, long, default_value = "20")]
        objects: usize,
        /// Number of movement steps
        #[arg(short, long, default_value = "50")]
        steps: u64,
        /// Seed for the deterministic movement
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    Square,
    Triangle,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Square => Domain::Square,
            DomainArg::Triangle => Domain::Triangle,
        }
    }
}

#[derive(Serialize)]
struct DecodeReport {
    id: NodeId,
    depth: u32,
    parent: Option<NodeId>,
    sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    triangle: Triangle,
    area: f32,
    footprint_radius: f32,
}

#[derive(Serialize)]
struct DemoReport {
    objects: usize,
    steps: u64,
    occupied_nodes: usize,
    regions: usize,
    placements: usize,
    busiest_node: Option<(u64, usize)>,
}

fn parse_handle(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid region handle {s:?}: {e}"))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LodConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LodConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn check_id(id: u64) -> anyhow::Result<NodeId> {
    Ok(NodeId::new(id)?)
}

fn decode_report(domain: Domain, id: u64, extents: f32) -> anyhow::Result<DecodeReport> {
    let node = check_id(id)?;
    let depth = node.depth();
    let triangle = decode_in(domain, id, depth, extents);
    Ok(DecodeReport {
        id: node,
        depth,
        parent: node.parent(),
        sibling: node.sibling(),
        children: node.children(),
        triangle,
        area: triangle.area(),
        footprint_radius: footprint_radius_in(domain, id, depth, extents),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded config");

    match cli.command {
        Commands::Info => {
            println!("subdiv-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", subdiv_common::crate_info());
            println!("cbt: {}", subdiv_cbt::crate_info());
            println!("leb: {}", subdiv_leb::crate_info());
            println!("occupancy: {}", subdiv_occupancy::crate_info());
            println!(
                "config: depth={} extents={} slab_height={}",
                config.default_depth, config.extents, config.slab_height
            );
        }
        Commands::Key { handle, z } => {
            let key = derive_key_with(handle, z, config.slab_height);
            emit(cli.json, &key, |k| k.to_string())?;
        }
        Commands::Decode { id, domain } => {
            let report = decode_report(domain.into(), id, config.extents)?;
            emit(cli.json, &report, |r| {
                let [a, b, c] = r.triangle.vertices;
                let parent = r.parent.map_or("-".to_string(), |p| p.to_string());
                let children = r
                    .children
                    .map_or("-".to_string(), |(l, h)| format!("{l},{h}"));
                format!(
                    "node {} (depth {}): v0={a} v1={b} v2={c} area={} radius={} parent={parent} children={children}",
                    r.id, r.depth, r.area, r.footprint_radius
                )
            })?;
        }
        Commands::Neighbors { id, domain } => {
            check_id(id)?;
            let n = neighbors_in(domain.into(), id);
            emit(cli.json, &n, |n: &Neighbors| {
                format!("left={} right={} edge={}", n.left, n.right, n.edge)
            })?;
        }
        Commands::Locate {
            x,
            y,
            depth,
            brute_force,
        } => {
            let depth = depth.unwrap_or(config.default_depth);
            let node = if brute_force {
                locate_brute_force(x, y, depth, config.extents)
            } else {
                subdiv_leb::locate(x, y, depth, config.extents)
            };
            if node == 0 {
                tracing::info!(x, y, "point lies outside the root square");
            }
            emit(cli.json, &node, |n| n.to_string())?;
        }
        Commands::Demo {
            objects,
            steps,
            seed,
        } => {
            let report = run_demo(config, objects, steps, seed)?;
            emit(cli.json, &report, |r| {
                format!(
                    "Demo: objects={} steps={} regions={} occupied_nodes={} placements={} busiest={:?}",
                    r.objects, r.steps, r.regions, r.occupied_nodes, r.placements, r.busiest_node
                )
            })?;
        }
    }

    Ok(())
}

/// Random-walk `count` objects inside one region and track them every step.
fn run_demo(config: LodConfig, count: usize, steps: u64, seed: u64) -> anyhow::Result<DemoReport> {
    let extents = config.extents;
    let mut lod = SubdivisionLod::new(config)?;
    let handle = RegionHandle::from_grid(1000, 1000);
    let mut rng = seed;
    let mut next = move || {
        rng = splitmix64(rng);
        (rng >> 40) as f32 / (1u64 << 24) as f32
    };

    let mut positions: Vec<Vec3> = (0..count)
        .map(|_| Vec3::new(next() * extents, next() * extents, next() * 2048.0))
        .collect();
    for (i, p) in positions.iter().enumerate() {
        lod.track_object(handle, None, Some(*p), format!("obj-{i}"));
    }

    for _ in 0..steps {
        for (i, p) in positions.iter_mut().enumerate() {
            let step = Vec3::new(next() - 0.5, next() - 0.5, next() - 0.5) * 16.0;
            let moved = (*p + step).clamp(Vec3::ZERO, Vec3::new(extents, extents, 2047.0));
            lod.track_object(handle, Some(*p), Some(moved), format!("obj-{i}"));
            *p = moved;
        }
    }

    let occupancy = lod.occupancy();
    let mut occupied_nodes = 0;
    let mut busiest_node = None;
    for key in occupancy.keys() {
        for node in occupancy.nodes(key) {
            occupied_nodes += 1;
            let n = occupancy.num_objects(key, node);
            if busiest_node.is_none_or(|(_, best)| n > best) {
                busiest_node = Some((node, n));
            }
        }
    }

    Ok(DemoReport {
        objects: count,
        steps,
        occupied_nodes,
        regions: lod.registered_regions().count(),
        placements: occupancy.total_placements(),
        busiest_node,
    })
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
