pub mod footer;
pub mod section;
