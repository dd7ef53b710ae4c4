//! Derived ratios.

/// Liabilities-to-equity ratio.
///
/// `None` when either operand is missing or equity is zero.
pub fn compute_ratio(liabilities: Option<f64>, equity: Option<f64>) -> Option<f64> {
    match (liabilities, equity) {
        (Some(liabilities), Some(equity)) if equity != 0.0 => {
            let ratio = liabilities / equity;
            ratio.is_finite().then_some(ratio)
        }
        _ => None,
    }
}
