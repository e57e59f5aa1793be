pub mod chapter;
pub mod summary;
