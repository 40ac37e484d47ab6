//! Map rendering: color scale and SVG output.

pub mod color;
pub mod map;

pub use color::{SequentialScale, percent_label};
pub use map::render_svg;
