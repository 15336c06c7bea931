/// Translate / rotate / skew / scale decomposition.
pub mod decompose;
/// Column-major 4×4 matrix operations.
pub mod matrix;
