use nalgebra::{DMatrix, DVector};
use factorial::Factorial;
use crate::utils::utils_errors::OptimaError;

pub struct FiniteDifferenceUtils;
impl FiniteDifferenceUtils {
    /// Time stencils should be with respect to the current time (i.e., current time should be 0.0,
    /// a time 1 second ago should be -1.0, etc.)
    pub fn get_fd_coefficients(time_stencils: &Vec<f64>, derivative_order: usize) -> Result<Vec<f64>, OptimaError> {
        let n = time_stencils.len();
        if derivative_order >= n {
            return Err(OptimaError::new_generic_error_str(&format!("derivative order {} needs more than {} stencil points.", derivative_order, n), file!(), line!()));
        }

        let mut m = DMatrix::<f64>::zeros(n, n);
        let mut v = DVector::<f64>::zeros(n);

        v[derivative_order] = derivative_order.factorial() as f64;

        for i in 0..n {
            for j in 0..n {
                m[(i,j)] = time_stencils[j].powi(i as i32);
            }
        }

        let m_inv = m.pseudo_inverse(0.00001).map_err(|e| OptimaError::new_generic_error_str(e, file!(), line!()))?;
        let res = m_inv * v;

        return Ok(res.data.as_slice().to_vec());
    }
    /// Central stencil over `diff_rule_length` samples (which must be odd), expressed in
    /// step units.  For `diff_rule_length = 7` the offsets are -3..=3.
    pub fn central_stencil_offsets(diff_rule_length: usize) -> Result<Vec<i64>, OptimaError> {
        if diff_rule_length < 3 || diff_rule_length % 2 == 0 {
            return Err(OptimaError::new_generic_error_str(&format!("diff rule length must be odd and at least 3 (got {}).", diff_rule_length), file!(), line!()));
        }
        let half = (diff_rule_length / 2) as i64;
        Ok((-half..=half).collect())
    }
    /// Coefficients of the central finite difference rule of the given derivative order with
    /// samples spaced by `discretization`.
    pub fn central_difference_coefficients(diff_rule_length: usize, derivative_order: usize, discretization: f64) -> Result<Vec<f64>, OptimaError> {
        let offsets = Self::central_stencil_offsets(diff_rule_length)?;
        let time_stencils: Vec<f64> = offsets.iter().map(|o| *o as f64).collect();
        let coefficients = Self::get_fd_coefficients(&time_stencils, derivative_order)?;
        let scale = discretization.powi(derivative_order as i32);
        Ok(coefficients.iter().map(|c| *c / scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_point_second_derivative_matches_textbook_rule() {
        let c = FiniteDifferenceUtils::central_difference_coefficients(3, 2, 1.0).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!((c[1] + 2.0).abs() < 1e-6);
        assert!((c[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn acceleration_rule_is_exact_on_parabola() {
        let dt = 0.1;
        let c = FiniteDifferenceUtils::central_difference_coefficients(7, 2, dt).unwrap();
        let offsets = FiniteDifferenceUtils::central_stencil_offsets(7).unwrap();
        let acc: f64 = offsets.iter().zip(c.iter()).map(|(o, c)| {
            let t = 1.0 + *o as f64 * dt;
            c * 1.5 * t * t
        }).sum();
        assert!((acc - 3.0).abs() < 1e-5, "{}", acc);
    }

    #[test]
    fn even_rule_length_is_rejected() {
        assert!(FiniteDifferenceUtils::central_stencil_offsets(4).is_err());
    }
}
