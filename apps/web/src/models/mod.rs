pub mod analysis;
pub mod chat;
pub mod job;
pub mod resume;
pub mod user;
