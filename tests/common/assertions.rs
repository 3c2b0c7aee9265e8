//! Assertion utilities for testing.
//!
//! Helpers for floating-point comparisons and session invariants.

#![allow(dead_code)]

use skope_session::SessionState;

/// Default relative tolerance for floating-point comparisons
pub const DEFAULT_RELATIVE_EPSILON: f64 = 1e-9;

/// Assert that two values are equal within a relative tolerance.
///
/// # Panics
///
/// Panics if `|actual - expected| > epsilon * |expected|`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_RELATIVE_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon * expected.abs(),
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that exactly one variable of the loaded dataset is visible and return its id.
///
/// # Panics
///
/// Panics if no dataset is loaded or if the number of visible variables is not one.
pub fn assert_single_visible(session: &SessionState) -> String {
    let visibility = session.variable_visibility();
    assert!(!visibility.is_empty(), "No variables to check");

    let visible: Vec<&str> = visibility
        .iter()
        .filter(|(_, visible)| *visible)
        .map(|(v, _)| v.id.as_str())
        .collect();
    assert_eq!(
        visible.len(),
        1,
        "Expected exactly one visible variable, got {:?}",
        visible
    );

    let id = visible[0].to_string();
    assert_eq!(session.variable().map(|v| v.id.as_str()), Some(id.as_str()));
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1e10, 1e10 + 1.0, None);
        assert_approx_eq(100.0, 100.5, Some(0.01));
    }
}
