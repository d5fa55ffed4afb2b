use anyhow::Result;

use crate::cli::{ColorArgs, Cli};
use crate::config::ConsolidationConfig;
use crate::geom::MunicipalityGeometries;
use crate::graph::TerritorialGraph;
use crate::io::{ensure_parent_exists, read_geometries, write_json};

pub fn run(cli: &Cli, args: &ColorArgs) -> Result<()> {
    let graph = TerritorialGraph::load_snapshot(&args.snapshot)?;
    let tolerance = ConsolidationConfig::default().adjacency_tolerance_deg;
    let geometries = MunicipalityGeometries::new(read_geometries(&args.geometries)?, tolerance)?;

    let coloring = graph.compute_utp_coloring(&geometries);
    let colors = coloring.values().copied().max().map_or(0, |c| c + 1);

    ensure_parent_exists(&args.output)?;
    write_json(&args.output, &coloring)?;

    if cli.verbose > 0 {
        eprintln!("[color] snapshot={} -> {}", args.snapshot.display(), args.output.display());
    }
    println!("{} municipalities colored with {colors} colors -> {}", coloring.len(), args.output.display());
    Ok(())
}
