//! Assertion utilities for testing.
//!
//! Helpers for floating-point comparisons and for comparing the coordinates
//! carried by two feature collections.

#![allow(dead_code)]

use geojson::FeatureCollection;

use carbonarr::vector_loader::collection_positions;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two arrays of floating-point values are approximately element-wise equal.
pub fn assert_array_approx_eq(actual: &[f64], expected: &[f64], epsilon: Option<f64>) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Arrays have different lengths: actual = {}, expected = {}",
        actual.len(),
        expected.len()
    );

    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= eps,
            "Arrays differ at index {}: actual = {}, expected = {}, diff = {}, epsilon = {}",
            i,
            a,
            e,
            diff,
            eps
        );
    }
}

/// Sorted, deduplicated coordinates of every geometry in a collection
pub fn coordinate_set(collection: &FeatureCollection) -> Vec<[f64; 2]> {
    let mut positions = collection_positions(collection);
    positions.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    positions.dedup();
    positions
}

/// Assert that two collections cover the same set of coordinates, ignoring order
pub fn assert_same_coordinates(actual: &FeatureCollection, expected: &FeatureCollection) {
    let actual = coordinate_set(actual);
    let expected = coordinate_set(expected);

    assert_eq!(
        actual.len(),
        expected.len(),
        "Coordinate sets differ in size: actual = {:?}, expected = {:?}",
        actual,
        expected
    );
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_array_approx_eq(a, e, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0 + 1e-12, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_array_approx_eq() {
        assert_array_approx_eq(&[1.0, 2.0], &[1.0, 2.0], None);
        assert_array_approx_eq(&[1.0, 2.0], &[1.001, 2.001], Some(0.01));
    }
}
