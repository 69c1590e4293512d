//! End-to-end tests for the aggregate → vectorize → weight → rank → project
//! flow, using small hand-built batches instead of warehouse extracts.

use std::collections::HashSet;

use timbre_core::{EntityFeatureTable, Error, Feature, FeatureSpace, RawFeatureRow, Weights};
use timbre_search::{
    aggregate_by_entity, aggregate_by_period, apply_weights, compare_profiles, cosine_similarity,
    find_neighbors, project_2d, sample_space, similarity_matrix, trend_changes, vectorize,
    PointCategory, ProjectionOptions, WeightSession,
};

fn track(artist: &str, values: [f64; 11]) -> RawFeatureRow {
    Feature::ALL
        .iter()
        .zip(values)
        .fold(RawFeatureRow::new(artist), |row, (&f, v)| row.with(f, v))
}

/// A small chart: two dance acts, two acoustic acts, one rap act.
fn chart() -> Vec<RawFeatureRow> {
    vec![
        track("Daft Punk", [0.80, 0.85, 0.05, 0.30, 0.10, 0.70, 0.05, 5.0, 1.0, 123.0, 4.0]),
        track("Daft Punk", [0.75, 0.80, 0.02, 0.50, 0.15, 0.60, 0.04, 7.0, 1.0, 120.0, 4.0]),
        track("Justice", [0.72, 0.90, 0.01, 0.40, 0.20, 0.55, 0.06, 4.0, 0.0, 125.0, 4.0]),
        track("Nick Drake", [0.35, 0.20, 0.92, 0.05, 0.10, 0.25, 0.04, 2.0, 0.0, 85.0, 4.0]),
        track("Nick Drake", [0.40, 0.25, 0.88, 0.10, 0.12, 0.30, 0.03, 9.0, 1.0, 90.0, 3.0]),
        track("Iron & Wine", [0.38, 0.22, 0.90, 0.02, 0.09, 0.35, 0.04, 0.0, 1.0, 92.0, 4.0]),
        track("Kendrick Lamar", [0.70, 0.65, 0.10, 0.00, 0.30, 0.45, 0.35, 1.0, 1.0, 95.0, 4.0]),
    ]
}

fn artist_space() -> FeatureSpace {
    let agg = aggregate_by_entity(&chart(), &Feature::ALL).unwrap();
    vectorize(&agg.table).unwrap().space
}

fn scenario_space() -> FeatureSpace {
    FeatureSpace::from_parts(
        vec![Feature::Energy, Feature::Valence, Feature::Tempo],
        (1..=5).map(|i| format!("entity-{i}")).collect(),
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.01],
            vec![0.0, 0.0, 1.0],
            vec![0.9, 0.1, 0.0],
        ],
    )
    .unwrap()
}

/// Artist-level means feed a space with one entry per artist.
#[test]
fn test_artist_pipeline_recommends_similar_genre() {
    let space = artist_space();
    assert_eq!(space.len(), 5);

    let result = find_neighbors("Nick Drake", &space, 1, false).unwrap();
    assert_eq!(result.neighbors[0].name, "Iron & Wine");

    let result = find_neighbors("Daft Punk", &space, 1, false).unwrap();
    assert_eq!(result.neighbors[0].name, "Justice");
}

/// Every normalized value lies in [0, 1] and the space stays aligned.
#[test]
fn test_vectorize_ranges_and_alignment() {
    let table = EntityFeatureTable::from_raw_rows(&chart(), &Feature::ALL);
    let out = vectorize(&table).unwrap();

    assert_eq!(out.space.len(), table.len());
    assert_eq!(
        out.space.names().collect::<Vec<_>>(),
        table.names().collect::<Vec<_>>()
    );
    for v in out.space.vectors() {
        assert_eq!(v.len(), 11);
        assert!(v.iter().all(|x| (-1e-12..=1.0 + 1e-12).contains(x)));
    }
}

/// Songs with a missing feature are dropped and reported, not fatal.
#[test]
fn test_missing_features_are_reported() {
    let mut rows = chart();
    rows.push(RawFeatureRow::new("Mystery").with(Feature::Energy, 0.5));

    let agg = aggregate_by_entity(&rows, &Feature::ALL).unwrap();
    assert_eq!(agg.report.dropped, vec!["Mystery"]);
    assert!(agg.table.names().all(|n| n != "Mystery"));

    let table = EntityFeatureTable::from_raw_rows(&rows, &Feature::ALL);
    let out = vectorize(&table).unwrap();
    assert_eq!(out.report.count(), 1);
    assert_eq!(out.space.len(), rows.len() - 1);
}

/// Querying entity 1 ranks the near-duplicate ahead of the close match.
#[test]
fn test_scenario_near_duplicate() {
    let result = find_neighbors("entity-1", &scenario_space(), 2, false).unwrap();
    assert_eq!(
        result.names().collect::<Vec<_>>(),
        vec!["entity-3", "entity-5"]
    );
}

/// No self, at most k, each identity once, scores non-increasing.
#[test]
fn test_neighbor_properties_hold_for_every_entity() {
    let space = artist_space();
    for name in space.names() {
        let result = find_neighbors(name, &space, 3, false).unwrap();
        assert!(result.len() <= 3);
        assert!(result.names().all(|n| n != name));

        let unique: HashSet<&str> = result.names().collect();
        assert_eq!(unique.len(), result.len());

        let scores = result.scores();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));

        let with_self = find_neighbors(name, &space, 3, true).unwrap();
        assert_eq!(with_self.neighbors[0].name, name);
        assert!((with_self.neighbors[0].score - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_self_similarity_is_one() {
    for v in artist_space().vectors() {
        if v.iter().any(|x| *x != 0.0) {
            assert!((cosine_similarity(v, v) - 1.0).abs() < 1e-12);
        }
    }
}

/// Up-weighting tempo against constant columns changes the ranking.
#[test]
fn test_tempo_weight_changes_ranking() {
    let space = FeatureSpace::from_parts(
        vec![Feature::Energy, Feature::Tempo],
        vec!["A".to_string(), "B".to_string(), "C".to_string()],
        vec![vec![0.5, 0.1], vec![0.5, 0.0], vec![0.5, 0.3]],
    )
    .unwrap();

    let unweighted = find_neighbors("A", &space, 1, false).unwrap();
    assert_eq!(unweighted.neighbors[0].name, "B");

    let weights = Weights::from_map([("tempo", 5.0)]).unwrap();
    let weighted_space = apply_weights(&space, &weights);
    let weighted = find_neighbors("A", &weighted_space, 1, false).unwrap();
    assert_eq!(weighted.neighbors[0].name, "C");

    // energy column untouched
    assert!(weighted_space.vectors().all(|v| v[0] == 0.5));
}

/// Resetting weights in a session restores the original ranking.
#[test]
fn test_session_round_trip() {
    let base = artist_space();
    let mut session = WeightSession::new(base.clone());

    session.set_weights(Weights::from_map([("speechiness", 5.0), ("tempo", 0.1)]).unwrap());
    assert_ne!(session.current(), &base);

    session.reset_weights();
    assert_eq!(session.current(), &base);
}

#[test]
fn test_unknown_artist() {
    let err = find_neighbors("Unknown Artist XYZ", &artist_space(), 3, false).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_invalid_weight_feature_rejected_before_computation() {
    let err = Weights::from_map([("loudness", 2.0)]).unwrap_err();
    assert!(matches!(err, Error::InvalidWeightFeature { .. }));
}

/// The neighborhood of a query projects with the query selected.
#[test]
fn test_project_neighborhood() {
    let space = artist_space();
    let result = find_neighbors("Daft Punk", &space, 4, true).unwrap();
    let scores = result.scores();
    let neighborhood = result.into_space().unwrap();

    let options = ProjectionOptions {
        iterations: 300,
        ..ProjectionOptions::default()
    };
    let projection = project_2d(&neighborhood, Some(&scores), &options).unwrap();

    assert_eq!(projection.points.len(), 5);
    assert_eq!(projection.perplexity, 4.0);
    assert_eq!(projection.points[0].name, "Daft Punk");
    assert_eq!(projection.points[0].category, PointCategory::Selected);
    assert_eq!(
        projection
            .with_category(PointCategory::TopSimilar)
            .count(),
        3
    );

    let again = project_2d(&neighborhood, Some(&scores), &options).unwrap();
    assert_eq!(projection, again);
}

#[test]
fn test_project_single_row_is_degenerate() {
    let space = artist_space().select(&[0]);
    let err = project_2d(&space, None, &ProjectionOptions::default()).unwrap_err();
    assert!(matches!(err, Error::DegenerateBatch { rows: 1, .. }));
}

/// A seeded sample gives a reproducible similarity heatmap.
#[test]
fn test_sampled_similarity_matrix() {
    let space = artist_space();
    let a = similarity_matrix(&sample_space(&space, 3, 42));
    let b = similarity_matrix(&sample_space(&space, 3, 42));

    assert_eq!(a, b);
    assert_eq!(a.len(), 3);
}

/// Profiles of the top matches come from the raw means, not the normalized space.
#[test]
fn test_profiles_of_top_matches() {
    let table = aggregate_by_entity(&chart(), &Feature::ALL).unwrap().table;
    let space = vectorize(&table).unwrap().space;
    let result = find_neighbors("Daft Punk", &space, 2, false).unwrap();
    let names: Vec<&str> = result.neighbors.iter().map(|n| n.name.as_str()).collect();

    let comparison = compare_profiles(&table, "Daft Punk", &names).unwrap();

    assert_eq!(comparison.matches.len(), 2);
    assert_eq!(comparison.matches[0].name, "Justice");
    let tempo = Feature::ALL.iter().position(|&f| f == Feature::Tempo).unwrap();
    assert!((comparison.selected.values[tempo] - 121.5).abs() < 1e-9);
    assert!((comparison.matches[0].differences[tempo] - 3.5).abs() < 1e-9);
}

/// Yearly means feed a trend report against the all-years average.
#[test]
fn test_trend_of_latest_year() {
    let rows: Vec<RawFeatureRow> = chart()
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.in_period(if i < 4 { "2019" } else { "2020" }))
        .collect();

    let years = aggregate_by_period(&rows, &Feature::DESCRIPTORS).unwrap();
    assert_eq!(years.table.names().collect::<Vec<_>>(), vec!["2019", "2020"]);

    let report = trend_changes(&years.table, "2020").unwrap();
    assert_eq!(report.changes.len(), Feature::DESCRIPTORS.len());
    let acoustic = report
        .changes
        .iter()
        .find(|c| c.feature == Feature::Acousticness)
        .unwrap();
    // the 2020 rows are mostly acoustic, so the period sits above the baseline
    assert!(acoustic.change < 0.0);
    assert!((acoustic.baseline - acoustic.period_mean - acoustic.change).abs() < 1e-12);
}
