pub mod common;
pub mod detect;
pub mod ingest;
pub mod patterns;
pub mod summary;
