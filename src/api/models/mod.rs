pub mod report;

pub use report::{Prediction, TrackerReport};
