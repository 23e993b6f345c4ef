//! Behavioral properties shared by every selection strategy.

use std::collections::HashSet;

use beam_select::selection::{
    distance, DiverseTopKSelector, KMedianSelector, LocalitySensitiveBucketSelector,
    ScoreErosionSelector, Selector, SelectorKind, TopKSelector,
};
use beam_select::{Model, ModelArena, ModelId};

fn spawn_all(coords: &[(i32, i32)]) -> Vec<Model> {
    let mut arena = ModelArena::new();
    coords
        .iter()
        .map(|&(x, y)| arena.spawn(x, y, None, 0.0))
        .collect()
}

fn square(side: i32) -> Vec<Model> {
    let coords: Vec<(i32, i32)> = (0..side)
        .flat_map(|x| (0..side).map(move |y| (x, y)))
        .collect();
    spawn_all(&coords)
}

fn from_origin(model: &Model) -> f64 {
    f64::from(model.x).hypot(f64::from(model.y))
}

fn ids(models: &[Model]) -> HashSet<ModelId> {
    models.iter().map(|m| m.id).collect()
}

#[test]
fn test_output_bounded_by_k() {
    let models = square(12);
    for kind in SelectorKind::ALL {
        if kind == SelectorKind::LocalitySensitiveBucket {
            continue;
        }
        for k in [1, 5, 30, 200] {
            let mut selector = kind.build(Some(11));
            let result = selector.select(&models, &from_origin, k);
            assert!(result.len() <= k, "{} returned {} > {}", kind, result.len(), k);
        }
    }
}

#[test]
fn test_output_drawn_from_input() {
    let models = square(10);
    let input = ids(&models);
    for kind in SelectorKind::ALL {
        let mut selector = kind.build(Some(5));
        let result = selector.select(&models, &from_origin, 8);
        assert!(
            result.iter().all(|m| input.contains(&m.id)),
            "{} invented a model",
            kind
        );
    }
}

#[test]
fn test_degenerate_inputs_return_empty() {
    let models = square(5);
    for kind in SelectorKind::ALL {
        let mut selector = kind.build(Some(1));
        assert!(selector.select(&[], &from_origin, 10).is_empty(), "{} on empty", kind);
        assert!(selector.select(&models, &from_origin, 0).is_empty(), "{} with k = 0", kind);
    }
}

#[test]
fn test_huge_k_never_exceeds_input() {
    let models = spawn_all(&[(0, 0), (3, 1), (6, 2), (9, 3), (12, 4)]);
    let input = ids(&models);
    for kind in SelectorKind::ALL {
        for k in [1 << 50, usize::MAX] {
            let mut selector = kind.build(Some(4));
            let result = selector.select(&models, &from_origin, k);

            assert!(!result.is_empty(), "{} selected nothing", kind);
            assert!(result.iter().all(|m| input.contains(&m.id)), "{}", kind);
            if kind != SelectorKind::LocalitySensitiveBucket {
                assert!(result.len() <= models.len(), "{} returned {}", kind, result.len());
            }
        }
    }
}

#[test]
fn test_top_k_example() {
    let models = spawn_all(&[(0, 0), (10, 0), (0, 10)]);
    let result = TopKSelector::new().select(&models, &from_origin, 2);

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].position(), (0, 0));
    assert!(matches!(result[1].position(), (10, 0) | (0, 10)));
}

#[test]
fn test_top_k_is_sorted_prefix() {
    let models = square(8);
    let result = TopKSelector::new().select(&models, &from_origin, 10);

    let mut scores: Vec<f64> = models.iter().map(from_origin).collect();
    scores.sort_by(f64::total_cmp);
    let picked: Vec<f64> = result.iter().map(from_origin).collect();
    assert_eq!(picked, scores[..10].to_vec());
}

#[test]
fn test_diverse_top_k_spacing() {
    let models = square(20);
    let result = DiverseTopKSelector::new().select(&models, &from_origin, 6);

    assert_eq!(result.len(), 6);
    for (i, a) in result.iter().enumerate() {
        for b in &result[i + 1..] {
            assert!(distance(a, b) >= 3.0, "{:?} too close to {:?}", a, b);
        }
    }
}

#[test]
fn test_diverse_top_k_small_input_unchanged() {
    let models = square(2);
    let result = DiverseTopKSelector::new().select(&models, &from_origin, 10);
    assert_eq!(result, models);
}

#[test]
fn test_k_medoid_one_per_cluster() {
    let mut coords = Vec::new();
    for (cx, cy) in [(0, 0), (50, 0), (0, 50)] {
        for dx in 0..3 {
            for dy in 0..3 {
                coords.push((cx + dx, cy + dy));
            }
        }
    }
    let models = spawn_all(&coords);

    let mut selector = KMedianSelector::new().with_seed(42);
    let clustering = selector.cluster(&models, 3);
    assert!(clustering.converged);
    assert!(clustering.iterations < selector.max_iterations());

    let result = KMedianSelector::new().with_seed(42).select(&models, &from_origin, 3);
    assert_eq!(result.len(), 3);
    assert!(ids(&result).len() == 3);
}

#[test]
fn test_erosion_first_pick_and_uniqueness() {
    let models = square(9);
    let result = ScoreErosionSelector::new().select(&models, &from_origin, 12);

    assert_eq!(result[0].position(), (0, 0));
    assert_eq!(ids(&result).len(), result.len());
    assert_eq!(result.len(), 12);
}

#[test]
fn test_locality_epoch_advances() {
    let models = square(10);
    let mut selector = LocalitySensitiveBucketSelector::new();
    let before = selector.window(5);

    selector.select(&models, &from_origin, 5);
    selector.select(&models, &from_origin, 5);

    assert_eq!(selector.epoch(), 3);
    let after = selector.window(5);
    assert!(after.max_range - after.min_range > before.max_range - before.min_range);
}
