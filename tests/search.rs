//! End-to-end searches and selector comparisons on the default sandbox.

use beam_select::benchmark::{compare, CompareOptions};
use beam_select::{BeamSearch, SandboxConfig, SearchStatus, SelectorKind};

#[test]
fn test_default_field_top_k_solves() {
    let config = SandboxConfig::default().with_selector(SelectorKind::TopK);
    let mut search = BeamSearch::from_config(&config).expect("default config is valid");
    let outcome = search.run();

    assert_eq!(outcome.status, SearchStatus::Solved);
    assert_eq!(outcome.steps, 99);

    let solution = outcome.solution.expect("solution present");
    assert_eq!(solution.path.first(), Some(&(50, 0)));
    assert_eq!(solution.path.last().map(|p| p.1), Some(99));
    for (row, cell) in solution.path.iter().enumerate() {
        assert_eq!(cell.1, row as i32);
    }
    assert!(outcome.frontier_sizes.iter().all(|&size| size <= 30));
}

#[test]
fn test_every_selector_finishes() {
    let config = SandboxConfig::default()
        .with_grid_size(40, 30)
        .with_beam_width(10)
        .with_seed(2);

    for kind in SelectorKind::ALL {
        let mut search =
            BeamSearch::from_config(&config.clone().with_selector(kind)).expect("valid config");
        let outcome = search.run();
        assert_eq!(outcome.status, SearchStatus::Solved, "{} did not solve", kind);
    }
}

#[test]
fn test_locality_beam_spreads_on_narrow_grid() {
    let config = SandboxConfig::default()
        .with_grid_size(40, 30)
        .with_beam_width(10)
        .with_selector(SelectorKind::LocalitySensitiveBucket);

    let outcome = BeamSearch::from_config(&config).expect("valid").run();
    assert_eq!(outcome.status, SearchStatus::Solved);
    assert!(
        outcome.frontier_sizes.iter().any(|&size| size > 1),
        "beam collapsed to one model: {:?}",
        outcome.frontier_sizes
    );
}

#[test]
fn test_seeded_search_is_reproducible() {
    let config = SandboxConfig::default()
        .with_selector(SelectorKind::RandomBucket)
        .with_seed(17);

    let first = BeamSearch::from_config(&config).expect("valid").run();
    let second = BeamSearch::from_config(&config).expect("valid").run();
    assert_eq!(
        first.solution.map(|s| s.path),
        second.solution.map(|s| s.path)
    );
}

#[tokio::test]
async fn test_compare_aggregates_every_selector() {
    let config = SandboxConfig::default()
        .with_grid_size(30, 20)
        .with_beam_width(8)
        .with_seed(1);
    let options = CompareOptions::new(vec![
        SelectorKind::TopK.into(),
        SelectorKind::Random.into(),
        SelectorKind::KMedoid.into(),
    ])
    .with_repetitions(3)
    .with_concurrency(2);

    let report = compare(&config, &options).await.expect("comparison runs");

    assert_eq!(report.beam_width, 8);
    assert_eq!(report.repetitions, 3);
    assert_eq!(report.selectors.len(), 3);
    for summary in &report.selectors {
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.steps.count, 3);
        assert!((summary.solved_ratio - 1.0).abs() < 1e-12);
    }

    let top_k = report.summary("top-k").expect("top-k present");
    assert_eq!(top_k.steps.std, 0.0);
    assert_eq!(top_k.path_length.std, 0.0);
}

#[tokio::test]
async fn test_compare_rejects_invalid_setup() {
    let config = SandboxConfig::default();
    let options = CompareOptions::new(vec![SelectorKind::TopK.into()]).with_repetitions(0);
    assert!(compare(&config, &options).await.is_err());
}
