pub mod app;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod fraction;
pub mod geography;
pub mod observation;
pub mod output;
pub mod render;
pub mod season;
pub mod station;

pub use error::{FogError, Result};
