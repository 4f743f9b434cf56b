use std::ops::AddAssign;
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};

/// Outcome of planning one component (planning group) in one trial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningInfo {
    pub time: f64,
    pub iterations: usize,
    pub cost: f64,
    pub success: usize
}
impl PlanningInfo {
    pub fn new(time: f64, iterations: usize, cost: f64, success: bool) -> Self {
        Self {
            time,
            iterations,
            cost,
            success: if success { 1 } else { 0 }
        }
    }
    pub fn succeeded(&self) -> bool {
        self.success > 0
    }
}
impl AddAssign<&PlanningInfo> for PlanningInfo {
    fn add_assign(&mut self, rhs: &PlanningInfo) {
        self.time += rhs.time;
        self.iterations += rhs.iterations;
        self.cost += rhs.cost;
        self.success += rhs.success;
    }
}

/// Table of `PlanningInfo` indexed by trial, then component.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlanningInfoCollection {
    planning_infos: Vec<Vec<PlanningInfo>>,
    num_components: usize
}
impl PlanningInfoCollection {
    pub fn new(num_trials: usize, num_components: usize) -> Self {
        Self {
            planning_infos: vec![vec![PlanningInfo::default(); num_components]; num_trials],
            num_components
        }
    }
    /// Grows the table as needed.
    pub fn write(&mut self, trial: usize, component: usize, info: PlanningInfo) {
        if component >= self.num_components {
            self.num_components = component + 1;
            for row in self.planning_infos.iter_mut() { row.resize(self.num_components, PlanningInfo::default()); }
        }
        if trial >= self.planning_infos.len() {
            self.planning_infos.resize(trial + 1, vec![PlanningInfo::default(); self.num_components]);
        }
        self.planning_infos[trial][component] = info;
    }
    pub fn get(&self, trial: usize, component: usize) -> Option<&PlanningInfo> {
        self.planning_infos.get(trial)?.get(component)
    }
    pub fn num_trials(&self) -> usize {
        self.planning_infos.len()
    }
    pub fn num_components(&self) -> usize {
        self.num_components
    }
    /// Per-component means over trials, plus the mean of the per-trial sums.  A trial counts as
    /// a success only if every one of its components succeeded.
    pub fn summary(&self) -> PlanningInfoSummary {
        let num_trials = self.num_trials();
        let mut component_sums = vec![PlanningInfo::default(); self.num_components];
        let mut sum_of_sums = PlanningInfo::default();
        for j in 0..self.num_components {
            for i in 0..num_trials {
                component_sums[j] += &self.planning_infos[i][j];
            }
            sum_of_sums += &component_sums[j];
        }
        let num_successful_trials = self.planning_infos.iter().filter(|row| row.iter().all(|info| info.succeeded())).count();

        let denominator = num_trials.max(1) as f64;
        let mean = |info: &PlanningInfo| PlanningInfoMean {
            iterations: info.iterations as f64 / denominator,
            time: info.time / denominator,
            cost: info.cost / denominator,
            success_rate: info.success as f64 / denominator
        };

        let mut sum = mean(&sum_of_sums);
        sum.success_rate = num_successful_trials as f64 / denominator;

        PlanningInfoSummary {
            num_trials,
            num_components: self.num_components,
            components: component_sums.iter().map(|c| mean(c)).collect(),
            sum
        }
    }
    pub fn print_summary(&self) {
        if self.num_trials() == 0 { return; }
        let summary = self.summary();

        optima_print(&format!("{} Trials, {} components", summary.num_trials, summary.num_components), PrintMode::Println, PrintColor::Cyan, true, PrintVerbosity::Info);
        optima_print("Component Iterations Time Smoothness SuccessRate", PrintMode::Println, PrintColor::None, true, PrintVerbosity::Info);
        for (j, c) in summary.components.iter().enumerate() {
            optima_print(&format!("{} {:.6} {:.6} {:.6} {:.6}", j, c.iterations, c.time, c.cost, c.success_rate), PrintMode::Println, PrintColor::None, false, PrintVerbosity::Info);
        }
        let s = &summary.sum;
        optima_print(&format!("Sum {:.6} {:.6} {:.6} {:.6}", s.iterations, s.time, s.cost, s.success_rate), PrintMode::Println, PrintColor::Green, false, PrintVerbosity::Info);

        optima_print("plannings info", PrintMode::Println, PrintColor::Cyan, true, PrintVerbosity::Debug);
        for (i, row) in self.planning_infos.iter().enumerate() {
            let mut total = PlanningInfo::default();
            for info in row { total += info; }
            optima_print(&format!("[{}] {} {:.6} {:.6}", i, total.iterations, total.time, total.cost), PrintMode::Println, PrintColor::None, false, PrintVerbosity::Debug);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanningInfoMean {
    pub iterations: f64,
    pub time: f64,
    pub cost: f64,
    pub success_rate: f64
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanningInfoSummary {
    pub num_trials: usize,
    pub num_components: usize,
    pub components: Vec<PlanningInfoMean>,
    pub sum: PlanningInfoMean
}
