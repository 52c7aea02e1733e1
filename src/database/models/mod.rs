pub(crate) mod macros;

pub mod member;
pub mod prayer_request;
pub mod small_group;

// Re-export all models for easy importing
pub use member::*;
pub use prayer_request::*;
pub use small_group::*;
