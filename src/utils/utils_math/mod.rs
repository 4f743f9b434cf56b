pub mod finite_difference;
pub mod interpolation;
pub mod polynomial;
