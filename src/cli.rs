use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// UTP seat consolidation CLI
#[derive(Parser, Debug)]
#[command(name = "openutp", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one seat consolidation pass and write its outputs
    Consolidate(ConsolidateArgs),

    /// Recompute the UTP coloring of a snapshot
    Color(ColorArgs),

    /// Print a summary of a snapshot and its invariant violations
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ConsolidateArgs {
    /// Base territorial records (cd_mun, nm_mun, utp_id, rm_name)
    #[arg(long, value_hint = ValueHint::FilePath, required_unless_present = "snapshot")]
    pub base: Option<PathBuf>,

    /// Seat and rank records (cd_mun, utp_id, regic)
    #[arg(long, value_hint = ValueHint::FilePath, required_unless_present = "snapshot")]
    pub seats: Option<PathBuf>,

    /// Start from a previously exported snapshot instead of base + seats
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with_all = ["base", "seats"])]
    pub snapshot: Option<PathBuf>,

    /// Per-seat metrics table
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metrics: PathBuf,

    /// Municipality geometries (.geojson or .shp, keyed by CD_MUN)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub geometries: PathBuf,

    /// Trip table (mun_origem, mun_destino, viagens)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub flows: Option<PathBuf>,

    /// Travel time table (mun_origem, mun_destino, tempo_h)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub impedances: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Also export the hierarchy edges (parent;child;parent_type;child_type)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub hierarchy: Option<PathBuf>,

    /// Output directory (overrides the configured one)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Snapshot to color
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: PathBuf,

    /// Municipality geometries (.geojson or .shp, keyed by CD_MUN)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub geometries: PathBuf,

    /// Output coloring file (municipality code -> color)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Snapshot to inspect
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: PathBuf,
}
