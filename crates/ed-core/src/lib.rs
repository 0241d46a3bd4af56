pub mod config;
pub mod generation;
pub mod period;
pub mod shaper;
