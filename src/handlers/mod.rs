pub mod auth;
pub mod directory;
pub mod members;
pub mod photos;
pub mod prayer_requests;
pub mod shared;
pub mod small_groups;
