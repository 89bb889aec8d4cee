pub mod engine;
pub mod object;
pub mod local;
pub mod gcs;

pub use engine::*;
pub use object::*;
