pub mod models;
pub mod tracker;

pub use models::{Prediction, TrackerReport};
pub use tracker::MultiplierTracker;
