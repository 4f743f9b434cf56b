use nalgebra::{DMatrix, DVector};
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;

/// Natural cubic spline through scalar knots `(x_i, y_i)` with strictly increasing `x_i`.
/// The second derivative vanishes at both end knots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NaturalCubicSpline {
    knots_x: Vec<f64>,
    knots_y: Vec<f64>,
    /// Second derivative of the spline at each knot.
    knot_second_derivatives: Vec<f64>
}
impl NaturalCubicSpline {
    pub fn new(knots_x: Vec<f64>, knots_y: Vec<f64>) -> Result<Self, OptimaError> {
        if knots_x.len() != knots_y.len() {
            return Err(OptimaError::new_generic_error_str(&format!("spline needs as many x knots as y knots ({} vs {}).", knots_x.len(), knots_y.len()), file!(), line!()));
        }
        if knots_x.len() < 2 {
            return Err(OptimaError::new_generic_error_str("spline needs at least two knots.", file!(), line!()));
        }
        for i in 1..knots_x.len() {
            if !(knots_x[i] > knots_x[i-1]) {
                return Err(OptimaError::new_generic_error_str(&format!("spline knots must be strictly increasing (knot {} is {} after {}).", i, knots_x[i], knots_x[i-1]), file!(), line!()));
            }
        }

        let knot_second_derivatives = Self::solve_second_derivatives(&knots_x, &knots_y)?;

        Ok(Self {
            knots_x,
            knots_y,
            knot_second_derivatives
        })
    }
    fn solve_second_derivatives(x: &Vec<f64>, y: &Vec<f64>) -> Result<Vec<f64>, OptimaError> {
        let n = x.len();
        if n == 2 { return Ok(vec![0.0, 0.0]); }

        // Interior unknowns only; the natural boundary pins the end values to zero.
        let m = n - 2;
        let mut a = DMatrix::<f64>::zeros(m, m);
        let mut b = DVector::<f64>::zeros(m);

        for row in 0..m {
            let i = row + 1;
            let h0 = x[i] - x[i-1];
            let h1 = x[i+1] - x[i];

            a[(row, row)] = 2.0 * (h0 + h1);
            if row > 0 { a[(row, row - 1)] = h0; }
            if row + 1 < m { a[(row, row + 1)] = h1; }

            b[row] = 6.0 * ((y[i+1] - y[i]) / h1 - (y[i] - y[i-1]) / h0);
        }

        let solution = a.lu().solve(&b).ok_or(OptimaError::new_generic_error_str("natural spline system is singular.", file!(), line!()))?;

        let mut out_vec = vec![0.0];
        for v in solution.iter() { out_vec.push(*v); }
        out_vec.push(0.0);

        Ok(out_vec)
    }
    /// Evaluates the spline at `x`.  Values outside the knot range are clamped to the end knots.
    pub fn interpolate(&self, x: f64) -> f64 {
        let n = self.knots_x.len();
        if x <= self.knots_x[0] { return self.knots_y[0]; }
        if x >= self.knots_x[n-1] { return self.knots_y[n-1]; }

        let i = self.segment_idx(x);
        let x0 = self.knots_x[i];
        let x1 = self.knots_x[i+1];
        let h = x1 - x0;
        let m0 = self.knot_second_derivatives[i];
        let m1 = self.knot_second_derivatives[i+1];

        let a = (x1 - x) / h;
        let b = (x - x0) / h;

        a * self.knots_y[i] + b * self.knots_y[i+1] + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * (h * h) / 6.0
    }
    pub fn second_derivative(&self, x: f64) -> f64 {
        let n = self.knots_x.len();
        if x <= self.knots_x[0] { return self.knot_second_derivatives[0]; }
        if x >= self.knots_x[n-1] { return self.knot_second_derivatives[n-1]; }

        let i = self.segment_idx(x);
        let h = self.knots_x[i+1] - self.knots_x[i];
        let b = (x - self.knots_x[i]) / h;
        (1.0 - b) * self.knot_second_derivatives[i] + b * self.knot_second_derivatives[i+1]
    }
    /// Index of the segment `[x_i, x_{i+1})` containing `x`.
    fn segment_idx(&self, x: f64) -> usize {
        let n = self.knots_x.len();
        let res = self.knots_x.binary_search_by(|k| k.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Less));
        let idx = match res {
            Ok(idx) => { idx }
            Err(idx) => { idx.saturating_sub(1) }
        };
        idx.min(n - 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_boundary_has_zero_curvature_at_ends() {
        let s = NaturalCubicSpline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 2.0, 1.0, 3.0]).unwrap();
        assert!(s.second_derivative(0.0).abs() < 1e-12);
        assert!(s.second_derivative(3.0).abs() < 1e-12);
    }

    #[test]
    fn two_knots_give_a_straight_line() {
        let s = NaturalCubicSpline::new(vec![0.0, 2.0], vec![1.0, 3.0]).unwrap();
        assert!((s.interpolate(0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn repeated_knots_are_rejected() {
        assert!(NaturalCubicSpline::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
    }
}
