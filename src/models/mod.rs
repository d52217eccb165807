pub mod base_model;
pub mod isolation_forest;
pub mod isolation_tree;
pub mod path_length;
pub mod robust_zscore;
