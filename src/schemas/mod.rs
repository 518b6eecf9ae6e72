pub mod common;
pub mod edit;
pub mod thumb;
