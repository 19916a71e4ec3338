pub mod elevation;
pub mod export;
pub mod geo;
pub mod itinerary;
pub mod nearest;
pub mod parse;
pub mod process;
pub mod resample;
pub mod time_model;

pub use process::build_track;
