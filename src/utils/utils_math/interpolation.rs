use nalgebra::DVector;
use itertools::Itertools;

pub struct SimpleInterpolationUtils;
impl SimpleInterpolationUtils {
    /// Running sum of euclidean distances between consecutive points.  The first entry is always 0.0.
    pub fn cumulative_distances(points: &Vec<DVector<f64>>) -> Vec<f64> {
        let mut out_vec = vec![];
        if points.is_empty() { return out_vec; }

        out_vec.push(0.0);
        let mut accumulated = 0.0;
        for (a, b) in points.iter().tuple_windows() {
            accumulated += (b - a).norm();
            out_vec.push(accumulated);
        }

        out_vec
    }
    /// Normalized position of `idx` in the closed index range `[range_start, range_end]`.
    #[inline]
    pub fn normalized_index(idx: usize, range_start: usize, range_end: usize) -> f64 {
        assert!(range_end > range_start);
        (idx as f64 - range_start as f64) / (range_end - range_start) as f64
    }
}
