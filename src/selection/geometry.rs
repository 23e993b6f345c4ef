//! Distance helpers shared by the spatial strategies.

use ndarray::Array2;

use crate::model::Model;

/// Euclidean distance between two models' grid positions.
pub fn distance(a: &Model, b: &Model) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Computes the symmetric pairwise distance matrix for a set of models.
///
/// Entry `[[i, j]]` is the distance between `models[i]` and `models[j]`;
/// the diagonal is zero.
pub fn pairwise_distances(models: &[Model]) -> Array2<f64> {
    let n = models.len();
    let mut distance_matrix = Array2::zeros((n, n));

    for i in 0..n {
        for j in (i + 1)..n {
            let dist = distance(&models[i], &models[j]);
            distance_matrix[[i, j]] = dist;
            distance_matrix[[j, i]] = dist;
        }
    }

    distance_matrix
}
