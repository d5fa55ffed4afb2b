mod common;

use openutp::{
    ConsolidationConfig, TerritorialGraph, UtpLookup,
    config::{COLORING_JSON, LEDGER_JSON, RESULT_CSV, SNAPSHOT_JSON},
    consolidate::{
        Candidate, ChainContext, ConsolidationLedger, FlowRecord, FunctionalRelations, RejectionKind,
        SeatConsolidator, SeatMetrics, TableMetrics, execute_candidate, filter_candidates,
        resolve_reciprocal_conflicts, resolve_transitive_chains,
    },
    graph::{BaseRecord, SeatRecord},
};

use common::{alert_row, geometries, make_graph, seat_row};

/// 409 (Belém), 366 (Cabrobó) and 675 (Salgueiro) side by side, each its
/// own UTP outside any metropolitan region.
fn sertao() -> (TerritorialGraph, openutp::MunicipalityGeometries, TableMetrics) {
    let graph = make_graph(&[(409, "1", None), (366, "2", None), (675, "3", None)]);
    let geoms = geometries(&[(409, 0.0, 0.0), (366, 1.0, 0.0), (675, 2.0, 0.0)]);
    let metrics = TableMetrics::new(vec![
        alert_row(409, "Belém do São Francisco", "1", "Centro Local", 366, 1.0),
        alert_row(366, "Cabrobó", "2", "Centro Local", 675, 0.8),
        SeatMetrics { has_airport: true, ..seat_row(675, "Salgueiro", "3", "Capital Regional A") },
    ]);
    (graph, geoms, metrics)
}

fn find(cands: &[Candidate], origin: u32, dest: u32) -> Option<&Candidate> {
    cands.iter().find(|c| c.links(origin, dest))
}

#[test]
fn filter_approves_scored_destination_and_rejects_rank_tie() {
    let (graph, geoms, metrics) = sertao();
    let rows = openutp::consolidate::MetricsProvider::seat_metrics(&metrics, &graph).unwrap();
    let (approved, rejected, stats) = filter_candidates(&graph, &geoms, &rows, &ConsolidationConfig::default());

    assert_eq!(approved.len(), 1);
    let direct = find(&approved, 366, 675).unwrap();
    assert_eq!((direct.origin_score, direct.dest_score), (0, 1));

    let tie = find(&rejected, 409, 366).unwrap();
    assert_eq!(tie.rejection_kind(), Some(RejectionKind::RankNotBetter));
    assert_eq!(stats.total_checked, 3);
    assert_eq!(stats.no_alert, 1);
    assert_eq!(stats.rank_not_better, 1);
    assert_eq!(stats.accepted, 1);
}

#[test]
fn chain_with_direct_evidence_is_approved_transitively() {
    let (mut graph, geoms, metrics) = sertao();
    let relations = FunctionalRelations::new().with_flows([FlowRecord { origin: 409, dest: 675, trips: 40.0 }]);
    let dir = tempfile::tempdir().unwrap();

    let outcome = SeatConsolidator::new(&mut graph, &geoms, &metrics, &relations, ConsolidationConfig::default())
        .run(dir.path())
        .unwrap();

    let transitive = find(&outcome.approved, 409, 675).unwrap();
    assert!(transitive.transitive);
    assert!(transitive.transitive_reason.contains("409 -> 366 -> 675"));
    assert!(find(&outcome.approved, 409, 366).is_none());
    assert!(find(&outcome.rejected, 409, 366).is_none());
    assert!(find(&outcome.approved, 366, 675).is_some());
    assert_eq!(outcome.executed, 2);

    assert_eq!(graph.utp_members("3"), vec![366, 409, 675]);
    assert_eq!(graph.seat_of("3"), Some(675));
    assert!(!graph.has_utp("1"));
    assert!(!graph.has_utp("2"));
    assert!(graph.check_invariants().is_empty());
}

#[test]
fn chain_without_direct_evidence_falls_back_locally() {
    let (mut graph, geoms, metrics) = sertao();
    let relations = FunctionalRelations::new();
    let dir = tempfile::tempdir().unwrap();

    let outcome = SeatConsolidator::new(&mut graph, &geoms, &metrics, &relations, ConsolidationConfig::default())
        .run(dir.path())
        .unwrap();

    let local = find(&outcome.approved, 409, 366).unwrap();
    assert!(!local.transitive);
    assert!(local.local_fallback);
    assert!(find(&outcome.approved, 366, 675).is_none());
    let cancelled = find(&outcome.rejected, 366, 675).unwrap();
    assert_eq!(cancelled.rejection_kind(), Some(RejectionKind::ChainCancelled));
    assert_eq!(outcome.executed, 1);

    assert_eq!(graph.utp_members("2"), vec![366, 409]);
    assert_eq!(graph.seat_of("2"), Some(366));
    assert_eq!(graph.utp_members("3"), vec![675]);
    assert!(graph.check_invariants().is_empty());
}

#[test]
fn cycle_in_the_approved_chain_keeps_the_rejection() {
    let (graph, geoms, metrics) = sertao();
    let rows = metrics.rows().to_vec();
    let relations = FunctionalRelations::new();
    let config = ConsolidationConfig::default();

    let link = |origin: u32, dest: u32| Candidate {
        origin_seat: origin,
        dest_seat: Some(dest),
        ..Default::default()
    };
    let mut approved = vec![link(366, 675), link(675, 366)];
    let mut tie = link(409, 366);
    tie.origin_utp = "1".into();
    tie.dest_utp = Some("2".into());
    tie.reject(RejectionKind::RankNotBetter, "both score 0, destination rank not better (11 >= 11)");
    let mut rejected = vec![tie];

    let ctx = ChainContext { graph: &graph, geometries: &geoms, metrics: &rows, relations: &relations, config: &config };
    let stats = resolve_transitive_chains(&mut approved, &mut rejected, &ctx);

    assert_eq!(stats.cycles, 1);
    assert_eq!(approved.len(), 2);
    assert_eq!(rejected.len(), 1);
    let reason = &rejected[0].rejection.as_ref().unwrap().reason;
    assert!(reason.contains("cycle"));
}

#[test]
fn reciprocal_conflict_moves_the_smaller_flow_side() {
    let mut graph = make_graph(&[(1, "A", None), (2, "B", None)]);
    let candidate = |origin: u32, dest: u32, utp: &str, dest_utp: &str| Candidate {
        origin_seat: origin,
        origin_utp: utp.into(),
        dest_seat: Some(dest),
        dest_utp: Some(dest_utp.into()),
        ..Default::default()
    };
    let relations = FunctionalRelations::new().with_flows([
        FlowRecord { origin: 1, dest: 99, trips: 1000.0 },
        FlowRecord { origin: 2, dest: 99, trips: 500.0 },
    ]);

    let (kept, discarded) = resolve_reciprocal_conflicts(
        vec![candidate(1, 2, "A", "B"), candidate(2, 1, "B", "A")],
        &relations,
    );
    assert_eq!(kept.len(), 1);
    assert!(kept[0].links(2, 1));
    assert!(discarded[0].links(1, 2));

    execute_candidate(&mut graph, &kept[0]).unwrap();
    assert_eq!(graph.utp_members("A"), vec![1, 2]);
    assert_eq!(graph.seat_of("A"), Some(1));
    assert!(!graph.has_utp("B"));
}

#[test]
fn reciprocal_conflict_with_equal_flows_moves_nobody() {
    let candidate = |origin: u32, dest: u32| Candidate { origin_seat: origin, dest_seat: Some(dest), ..Default::default() };
    let relations = FunctionalRelations::new().with_flows([
        FlowRecord { origin: 1, dest: 99, trips: 250.0 },
        FlowRecord { origin: 2, dest: 99, trips: 250.0 },
    ]);
    let (kept, discarded) = resolve_reciprocal_conflicts(vec![candidate(1, 2), candidate(2, 1)], &relations);
    assert!(kept.is_empty());
    assert_eq!(discarded.len(), 2);
    assert!(discarded.iter().all(|c| c.rejection_kind() == Some(RejectionKind::ReciprocalConflict)));
}

#[test]
fn pass_writes_every_output_file() {
    let (mut graph, geoms, metrics) = sertao();
    let relations = FunctionalRelations::new().with_flows([FlowRecord { origin: 409, dest: 675, trips: 40.0 }]);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("processed");

    let mut consolidator = SeatConsolidator::new(&mut graph, &geoms, &metrics, &relations, ConsolidationConfig::default());
    let outcome = consolidator.run(&out).unwrap();
    assert_eq!(consolidator.ledger().len(), 2);

    for name in [RESULT_CSV, LEDGER_JSON, COLORING_JSON, SNAPSHOT_JSON] {
        assert!(out.join(name).is_file(), "{name} was not written");
    }

    let ledger = ConsolidationLedger::load(&out.join(LEDGER_JSON)).unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.entries()[0].source_utp, "2");
    assert_eq!(ledger.entries()[0].target_utp, "3");
    assert!(ledger.entries()[0].reason.starts_with("Sede consolidation (full UTP): Score 0->1, Travel 0.80h"));

    let csv = std::fs::read_to_string(out.join(RESULT_CSV)).unwrap();
    assert!(csv.lines().next().unwrap().ends_with("status,transitive,transitive_reason,motivo_rejeicao"));
    assert!(csv.contains("SIM"));

    let restored = TerritorialGraph::load_snapshot(&out.join(SNAPSHOT_JSON)).unwrap();
    assert_eq!(restored.utp_seeds(), graph.utp_seeds());
    assert_eq!(restored.get_municipality_utp(409), UtpLookup::Assigned("3".into()));
    assert!(restored.is_seat_flagged(675));
    assert!(!restored.is_seat_flagged(409));
    assert_eq!(outcome.coloring.len(), 3);
}

#[test]
fn pass_without_candidates_still_writes_outputs() {
    let mut graph = make_graph(&[(1, "A", None), (2, "B", None)]);
    let geoms = geometries(&[(1, 0.0, 0.0), (2, 1.0, 0.0)]);
    let metrics = TableMetrics::new(vec![seat_row(1, "Um", "A", "Centro Local"), seat_row(2, "Dois", "B", "Centro Local")]);
    let relations = FunctionalRelations::new();
    let dir = tempfile::tempdir().unwrap();

    let outcome = SeatConsolidator::new(&mut graph, &geoms, &metrics, &relations, ConsolidationConfig::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(outcome.executed, 0);
    assert!(outcome.approved.is_empty());
    let ledger = std::fs::read_to_string(dir.path().join(LEDGER_JSON)).unwrap();
    assert_eq!(ledger.trim(), "[]");
    assert!(dir.path().join(RESULT_CSV).is_file());
}

#[test]
fn metro_mismatch_and_distance_are_rejected() {
    let graph = make_graph(&[(1, "A", Some("RM Recife")), (2, "B", None), (3, "C", None), (4, "D", None)]);
    let geoms = geometries(&[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 2.0, 0.0), (4, 10.0, 0.0)]);
    let config = ConsolidationConfig::default();
    let rows = vec![
        SeatMetrics { rm_label: "RM Recife".into(), ..alert_row(1, "Um", "A", "Centro Local", 2, 0.5) },
        alert_row(2, "Dois", "B", "Centro Local", 3, 2.5),
        alert_row(3, "Tres", "C", "Centro Local", 4, 1.0),
        SeatMetrics { has_airport: true, ..seat_row(4, "Quatro", "D", "Capital Regional A") },
    ];
    let (approved, rejected, _) = filter_candidates(&graph, &geoms, &rows, &config);

    assert!(approved.is_empty());
    assert_eq!(find(&rejected, 1, 2).unwrap().rejection_kind(), Some(RejectionKind::MetroMismatch));
    assert_eq!(find(&rejected, 2, 3).unwrap().rejection_kind(), Some(RejectionKind::TravelTimeExceeded));
    assert_eq!(find(&rejected, 3, 4).unwrap().rejection_kind(), Some(RejectionKind::NotAdjacent));
}

#[test]
fn unresolved_destinations_same_utp_and_self_sufficient_seats_are_rejected() {
    let base: Vec<BaseRecord> = [(1, "A"), (5, "A"), (2, "B"), (6, "D"), (3, "C"), (4, "E"), (7, "F")]
        .into_iter()
        .map(|(code, utp)| BaseRecord { code, name: format!("Mun {code}"), utp_id: utp.to_string(), rm_name: None })
        .collect();
    let seats: Vec<SeatRecord> = [(1, "A"), (2, "B"), (3, "C"), (4, "E"), (7, "F")]
        .into_iter()
        .map(|(code, utp)| SeatRecord { code, utp_id: utp.to_string(), rank_label: "Centro Local".to_string() })
        .collect();
    let mut graph = TerritorialGraph::new();
    graph.load_from_records(&base, &seats);

    let geoms = geometries(&[
        (7, -1.0, 0.0), (1, 0.0, 0.0), (5, 0.0, 5.0),
        (2, 10.0, 0.0), (6, 12.0, 0.0), (3, 20.0, 0.0), (4, 22.0, 0.0),
    ]);
    let rows = vec![
        alert_row(1, "Um", "A", "Centro Local", 5, 0.5),
        alert_row(2, "Dois", "B", "Centro Local", 6, 0.5),
        alert_row(3, "Tres", "C", "Centro Local", 4, 0.5),
        SeatMetrics { has_airport: true, ..alert_row(7, "Sete", "F", "Centro Local", 1, 0.5) },
    ];
    let (approved, rejected, stats) = filter_candidates(&graph, &geoms, &rows, &ConsolidationConfig::default());

    assert!(approved.is_empty());
    let reason = |origin: u32| {
        let cand = rejected.iter().find(|c| c.origin_seat == origin).unwrap();
        let rejection = cand.rejection.as_ref().unwrap();
        (rejection.kind, rejection.reason.clone())
    };

    let (kind, text) = reason(1);
    assert_eq!(kind, RejectionKind::SameUtp);
    assert_eq!(text, "same UTP");

    let (kind, text) = reason(2);
    assert_eq!(kind, RejectionKind::InvalidDestination);
    assert!(text.contains("destination UTP D has no active seat"), "{text}");

    let (kind, text) = reason(3);
    assert_eq!(kind, RejectionKind::InvalidDestination);
    assert!(text.contains("destination seat 4 not found in metrics"), "{text}");

    let (kind, text) = reason(7);
    assert_eq!(kind, RejectionKind::SelfSufficient);
    assert!(text.contains("self-sufficient"), "{text}");

    assert_eq!(stats.total_checked, 4);
    assert_eq!(stats.same_utp, 1);
    assert_eq!(stats.invalid_destination, 2);
    assert_eq!(stats.self_sufficient, 1);
    assert_eq!(stats.accepted, 0);
}

#[test]
fn chain_to_a_seat_the_origin_does_not_stand_below_keeps_the_rejection() {
    let graph = make_graph(&[(1, "A", None), (2, "B", None), (3, "C", None)]);
    let geoms = geometries(&[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 2.0, 0.0)]);
    let config = ConsolidationConfig::default();
    let rows = vec![
        alert_row(1, "Um", "A", "Centro de Zona A", 2, 0.5),
        alert_row(2, "Dois", "B", "Centro Local", 3, 0.5),
        seat_row(3, "Tres", "C", "Centro de Zona B"),
    ];
    let relations = FunctionalRelations::new().with_flows([FlowRecord { origin: 1, dest: 3, trips: 120.0 }]);

    let (mut approved, mut rejected, _) = filter_candidates(&graph, &geoms, &rows, &config);
    assert!(find(&approved, 2, 3).is_some());
    assert_eq!(find(&rejected, 1, 2).unwrap().rejection_kind(), Some(RejectionKind::RankNotBetter));

    let ctx = ChainContext { graph: &graph, geometries: &geoms, metrics: &rows, relations: &relations, config: &config };
    let stats = resolve_transitive_chains(&mut approved, &mut rejected, &ctx);

    assert_eq!((stats.examined, stats.transitive, stats.local_fallback, stats.cycles), (1, 0, 0, 0));
    assert_eq!(approved.len(), 1);
    assert!(find(&approved, 2, 3).is_some());
    assert!(find(&approved, 1, 3).is_none());
    let tie = find(&rejected, 1, 2).unwrap();
    assert_eq!(tie.rejection_kind(), Some(RejectionKind::RankNotBetter));
    assert!(tie.rejection.as_ref().unwrap().reason.contains("origin does not stand below final seat 3"));
}

#[test]
fn chain_to_a_seat_without_metrics_keeps_the_rejection() {
    let (graph, geoms, metrics) = sertao();
    let rows: Vec<SeatMetrics> = metrics.rows().iter().filter(|r| r.seat_code != 675).cloned().collect();
    let relations = FunctionalRelations::new().with_flows([FlowRecord { origin: 409, dest: 675, trips: 40.0 }]);
    let config = ConsolidationConfig::default();

    let mut approved = vec![Candidate { origin_seat: 366, dest_seat: Some(675), ..Default::default() }];
    let mut tie = Candidate { origin_seat: 409, origin_utp: "1".into(), dest_seat: Some(366), dest_utp: Some("2".into()), ..Default::default() };
    tie.reject(RejectionKind::RankNotBetter, "both score 0, destination rank not better (11 >= 11)");
    let mut rejected = vec![tie];

    let ctx = ChainContext { graph: &graph, geometries: &geoms, metrics: &rows, relations: &relations, config: &config };
    let stats = resolve_transitive_chains(&mut approved, &mut rejected, &ctx);

    assert_eq!((stats.examined, stats.transitive, stats.local_fallback), (1, 0, 0));
    assert_eq!(approved.len(), 1);
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].rejection.as_ref().unwrap().reason.contains("final seat 675 not found in metrics"));
}
