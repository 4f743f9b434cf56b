use serde::{Serialize, Deserialize};

/// A degree-5 polynomial segment defined over `[start_time, start_time + duration]`.
/// Internally it is stored over the normalized parameter `s = (t - start_time) / duration`,
/// so all boundary derivatives given in time units are scaled by the duration on construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuinticPolynomial {
    coefficients: [f64; 6],
    start_time: f64,
    duration: f64
}
impl QuinticPolynomial {
    /// The unique quintic matching position, velocity, and acceleration at both ends.
    pub fn interpolation(start_time: f64, x0: f64, v0: f64, a0: f64, end_time: f64, x1: f64, v1: f64, a1: f64) -> Self {
        let duration = end_time - start_time;
        assert!(duration > 0.0, "quintic segment must have positive duration (got {})", duration);

        let v0 = v0 * duration;
        let a0 = a0 * duration * duration;
        let v1 = v1 * duration;
        let a1 = a1 * duration * duration;

        let h = x1 - x0 - v0 - 0.5 * a0;
        let dv = v1 - v0 - a0;
        let da = a1 - a0;

        let coefficients = [
            x0,
            v0,
            0.5 * a0,
            10.0 * h - 4.0 * dv + 0.5 * da,
            -15.0 * h + 7.0 * dv - da,
            6.0 * h - 3.0 * dv + 0.5 * da
        ];

        Self {
            coefficients,
            start_time,
            duration
        }
    }
    /// Min-jerk segment from `(x0, v0, a0)` to `x1` at rest.
    pub fn min_jerk_to_rest(start_time: f64, x0: f64, v0: f64, a0: f64, end_time: f64, x1: f64) -> Self {
        Self::interpolation(start_time, x0, v0, a0, end_time, x1, 0.0, 0.0)
    }
    /// Rest-to-rest min-jerk segment over the unit interval.
    pub fn rest_to_rest_normalized(x0: f64, x1: f64) -> Self {
        Self::interpolation(0.0, x0, 0.0, 0.0, 1.0, x1, 0.0, 0.0)
    }
    #[inline]
    pub fn evaluate_normalized(&self, s: f64) -> f64 {
        let c = &self.coefficients;
        c[0] + s * (c[1] + s * (c[2] + s * (c[3] + s * (c[4] + s * c[5]))))
    }
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.evaluate_normalized(self.normalize(t))
    }
    pub fn derivative(&self, t: f64) -> f64 {
        let s = self.normalize(t);
        let c = &self.coefficients;
        let d = c[1] + s * (2.0 * c[2] + s * (3.0 * c[3] + s * (4.0 * c[4] + s * 5.0 * c[5])));
        d / self.duration
    }
    pub fn second_derivative(&self, t: f64) -> f64 {
        let s = self.normalize(t);
        let c = &self.coefficients;
        let dd = 2.0 * c[2] + s * (6.0 * c[3] + s * (12.0 * c[4] + s * 20.0 * c[5]));
        dd / (self.duration * self.duration)
    }
    #[inline]
    fn normalize(&self, t: f64) -> f64 {
        (t - self.start_time) / self.duration
    }
    pub fn coefficients(&self) -> &[f64; 6] {
        &self.coefficients
    }
    pub fn start_time(&self) -> f64 {
        self.start_time
    }
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
