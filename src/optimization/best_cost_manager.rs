use std::sync::{Mutex, MutexGuard};
use ordered_float::OrderedFloat;

/// Shared record of the best candidate of the current attempt.  Every report is checked and
/// applied under one lock, so concurrent reports never lose the true minimum.  Equal costs are
/// resolved in favor of the lower candidate index.
#[derive(Debug)]
pub struct BestCostManager {
    state: Mutex<BestCostState>
}
impl BestCostManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BestCostState::default())
        }
    }
    pub fn reset(&self) {
        *self.lock() = BestCostState::default();
    }
    /// Returns true if `trajectory_index` is the best candidate after this report.  NaN costs are
    /// never recorded.
    pub fn report_cost(&self, trajectory_index: usize, cost: f64) -> bool {
        if cost.is_nan() { return false; }

        let mut state = self.lock();
        let cost = OrderedFloat(cost);
        let is_better = match state.best_trajectory_index {
            None => { true }
            Some(best_idx) => { cost < state.best_cost || (cost == state.best_cost && trajectory_index < best_idx) }
        };
        if is_better {
            state.best_trajectory_index = Some(trajectory_index);
            state.best_cost = cost;
        }
        state.best_trajectory_index == Some(trajectory_index)
    }
    pub fn best_trajectory_index(&self) -> Option<usize> {
        self.lock().best_trajectory_index
    }
    pub fn best_cost(&self) -> f64 {
        self.lock().best_cost.into_inner()
    }
    fn lock(&self) -> MutexGuard<'_, BestCostState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
impl Default for BestCostManager {
    fn default() -> Self { Self::new() }
}

#[derive(Clone, Debug)]
struct BestCostState {
    best_trajectory_index: Option<usize>,
    best_cost: OrderedFloat<f64>
}
impl Default for BestCostState {
    fn default() -> Self {
        Self {
            best_trajectory_index: None,
            best_cost: OrderedFloat(f64::INFINITY)
        }
    }
}
