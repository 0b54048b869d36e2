pub mod processing;
pub mod views;
