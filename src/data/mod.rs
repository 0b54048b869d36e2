pub mod export;
pub mod loader;
pub mod spectrum;
