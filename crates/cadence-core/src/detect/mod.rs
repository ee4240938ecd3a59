pub mod amounts;
pub mod builder;
pub mod dates;
pub mod frequency;
pub mod normalize;
pub mod policy;
pub mod types;
