pub mod lifecycle;
pub mod store;
pub mod summary;
pub mod types;
