use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use polars::{frame::DataFrame, prelude::NamedFrom, series::Series};

use crate::io::write_csv_with_separator;

use super::TerritorialGraph;

impl TerritorialGraph {
    /// Export every hierarchy edge as `parent;child;parent_type;child_type`.
    pub fn export_hierarchy_csv(&self, path: &Path) -> Result<()> {
        let edges = self.edges();
        let parents: Vec<String> = edges.iter().map(|(p, _)| p.key()).collect();
        let children: Vec<String> = edges.iter().map(|(_, c)| c.key()).collect();
        let parent_types: Vec<&str> = edges.iter().map(|(p, _)| p.node_type().to_str()).collect();
        let child_types: Vec<&str> = edges.iter().map(|(_, c)| c.node_type().to_str()).collect();

        let mut df = DataFrame::new(vec![
            Series::new("parent".into(), parents).into(),
            Series::new("child".into(), children).into(),
            Series::new("parent_type".into(), parent_types).into(),
            Series::new("child_type".into(), child_types).into(),
        ]).context("[TerritorialGraph.export_hierarchy_csv] Failed to build edge table")?;

        write_csv_with_separator(&mut df, path, b';')?;
        info!("[TerritorialGraph.export_hierarchy_csv] {} edges -> {}", edges.len(), path.display());
        Ok(())
    }
}
