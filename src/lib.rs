//! Optima CIO is a contact-invariant trajectory optimizer for articulated robots.
//! A planning request is split into planning groups; for each group a population of candidate
//! trajectories is seeded (min-jerk, waypoint spline, or Cartesian path through inverse
//! kinematics), optimized concurrently with one thread per candidate, and the lowest cost
//! candidate is merged back into the full body trajectory.
//! Inverse kinematics, collision checking, roadmap seeding and the per-iteration improvement
//! step are supplied by the host through traits.

pub mod optimization;
pub mod planner;
pub mod planning_capabilities;
pub mod planning_parameters;
pub mod robot_modules;
pub mod trajectory;
pub mod utils;
