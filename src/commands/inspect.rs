use anyhow::Result;

use crate::cli::{Cli, InspectArgs};
use crate::graph::TerritorialGraph;
use crate::types::NodeType;

pub fn run(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let graph = TerritorialGraph::load_snapshot(&args.snapshot)?;

    println!("snapshot: {}", args.snapshot.display());
    println!("nodes: {} ({} edges)", graph.node_count(), graph.edge_count());
    for ty in [NodeType::Metro, NodeType::Utp, NodeType::Municipality] {
        println!("  {:<13} {}", ty.to_str(), graph.nodes_of_type(ty).len());
    }
    println!("seats: {}", graph.utp_seeds().len());

    let unitary = graph.get_unitary_utps();
    println!("unitary UTPs: {}", unitary.len());
    if cli.verbose > 0 {
        for utp in &unitary {
            println!("  {utp} (seat {})", graph.seat_of(utp).map_or_else(|| "-".to_string(), |s| s.to_string()));
        }
    }

    let violations = graph.check_invariants();
    println!("invariant violations: {}", violations.len());
    for violation in &violations {
        println!("  {violation}");
    }
    Ok(())
}
