//! File storage for uploaded images.

mod local;

pub use local::LocalFileStore;
