pub mod datasets;
pub mod dom;
pub mod render;

pub use datasets::*;
pub use render::*;
