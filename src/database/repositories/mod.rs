pub mod member;
pub mod prayer_request;
pub mod small_group;
