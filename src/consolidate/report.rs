use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use polars::{frame::DataFrame, prelude::NamedFrom, series::Series};

use crate::io::write_csv;

use super::candidate::Candidate;

fn column<T>(rows: &[(&Candidate, bool)], f: impl Fn(&Candidate) -> T) -> Vec<T> {
    rows.iter().map(|(c, _)| f(c)).collect()
}

/// Build the result table: approved candidates first, then rejected ones.
pub fn result_frame(approved: &[Candidate], rejected: &[Candidate]) -> Result<DataFrame> {
    let rows: Vec<(&Candidate, bool)> = approved.iter().map(|c| (c, true))
        .chain(rejected.iter().map(|c| (c, false)))
        .collect();

    let status: Vec<&str> = rows.iter().map(|&(_, ok)| if ok { "APROVADO" } else { "REJEITADO" }).collect();
    let transitive: Vec<&str> = rows.iter().map(|(c, _)| if c.transitive { "SIM" } else { "NAO" }).collect();

    DataFrame::new(vec![
        Series::new("sede_origem".into(), column(&rows, |c| c.origin_seat)).into(),
        Series::new("utp_origem".into(), column(&rows, |c| c.origin_utp.clone())).into(),
        Series::new("sede_destino".into(), column(&rows, |c| c.dest_seat)).into(),
        Series::new("utp_destino".into(), column(&rows, |c| c.dest_utp.clone().unwrap_or_default())).into(),
        Series::new("tempo_viagem_h".into(), column(&rows, |c| c.travel_time_h)).into(),
        Series::new("score_origem".into(), column(&rows, |c| u32::from(c.origin_score))).into(),
        Series::new("score_destino".into(), column(&rows, |c| u32::from(c.dest_score))).into(),
        Series::new("rm_origem".into(), column(&rows, |c| c.rm_origin.clone())).into(),
        Series::new("rm_destino".into(), column(&rows, |c| c.rm_dest.clone())).into(),
        Series::new("status".into(), status).into(),
        Series::new("transitive".into(), transitive).into(),
        Series::new("transitive_reason".into(), column(&rows, |c| c.transitive_reason.clone())).into(),
        Series::new("motivo_rejeicao".into(),
            column(&rows, |c| c.rejection.as_ref().map(|r| r.reason.clone()).unwrap_or_default())).into(),
    ]).context("[consolidate::report] Failed to build result table")
}

/// Write one row per approved and rejected candidate.
pub fn write_result_csv(path: &Path, approved: &[Candidate], rejected: &[Candidate]) -> Result<()> {
    let mut df = result_frame(approved, rejected)?;
    write_csv(&mut df, path)?;
    info!("[consolidate::report] {} approved, {} rejected -> {}", approved.len(), rejected.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::candidate::RejectionKind;

    fn candidates() -> (Vec<Candidate>, Vec<Candidate>) {
        let approved = Candidate {
            origin_seat: 366,
            origin_utp: "10".into(),
            dest_seat: Some(675),
            dest_utp: Some("20".into()),
            travel_time_h: Some(0.8),
            dest_score: 1,
            ..Default::default()
        };
        let mut rejected = Candidate {
            origin_seat: 409,
            origin_utp: "5".into(),
            dest_seat: Some(366),
            dest_utp: Some("10".into()),
            ..Default::default()
        };
        rejected.reject(RejectionKind::RankNotBetter, "both score 0, destination rank not better (11 >= 11)");
        (vec![approved], vec![rejected])
    }

    #[test]
    fn frame_lists_approved_before_rejected() {
        let (approved, rejected) = candidates();
        let df = result_frame(&approved, &rejected).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 13);
        let status = df.column("status").unwrap().str().unwrap();
        assert_eq!(status.get(0), Some("APROVADO"));
        assert_eq!(status.get(1), Some("REJEITADO"));
    }

    #[test]
    fn empty_result_still_writes_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        write_result_csv(&path, &[], &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("sede_origem,utp_origem,sede_destino,utp_destino,tempo_viagem_h"));
    }

    #[test]
    fn rejection_reason_is_written() {
        let (approved, rejected) = candidates();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        write_result_csv(&path, &approved, &rejected).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("destination rank not better"));
        assert!(text.contains("REJEITADO"));
    }
}
