use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::cli::{Cli, ConsolidateArgs};
use crate::config::ConsolidationConfig;
use crate::consolidate::{FunctionalRelations, SeatConsolidator, TableMetrics};
use crate::geom::MunicipalityGeometries;
use crate::graph::TerritorialGraph;
use crate::io::{read_base_records, read_flows, read_geometries, read_impedances, read_seat_records};

pub fn run(cli: &Cli, args: &ConsolidateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ConsolidationConfig::from_json_file(path)?,
        None => ConsolidationConfig::default(),
    };
    if let Some(out) = &args.output {
        config.output_dir = out.display().to_string();
    }
    config.validate()?;

    let mut graph = match (&args.snapshot, &args.base, &args.seats) {
        (Some(snapshot), _, _) => TerritorialGraph::load_snapshot(snapshot)?,
        (None, Some(base), Some(seats)) => {
            let mut graph = TerritorialGraph::new();
            graph.load_from_records(&read_base_records(base)?, &read_seat_records(seats)?);
            graph
        }
        _ => anyhow::bail!("[consolidate] either --snapshot or both --base and --seats are required"),
    };

    let geometries = MunicipalityGeometries::new(read_geometries(&args.geometries)?, config.adjacency_tolerance_deg)
        .with_context(|| format!("[consolidate] Failed to index geometries from {}", args.geometries.display()))?;
    let metrics = TableMetrics::from_csv(&args.metrics)?;

    let mut relations = FunctionalRelations::new();
    if let Some(path) = &args.flows {
        relations = relations.with_flows(read_flows(path)?);
    }
    if let Some(path) = &args.impedances {
        relations = relations.with_impedances(read_impedances(path)?);
    }

    if cli.verbose > 0 {
        eprintln!("[consolidate] metrics={} geometries={} -> {}",
            args.metrics.display(), args.geometries.display(), config.output_dir);
    }

    let out_dir = PathBuf::from(&config.output_dir);
    let outcome = SeatConsolidator::new(&mut graph, &geometries, &metrics, &relations, config).run(&out_dir)?;

    if let Some(path) = &args.hierarchy {
        graph.export_hierarchy_csv(path)?;
    }

    info!("[consolidate] {} consolidations executed, {} candidates rejected", outcome.executed, outcome.rejected.len());
    println!("{} consolidations executed; outputs in {}", outcome.executed, out_dir.display());
    Ok(())
}
