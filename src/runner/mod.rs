pub mod job;
pub mod protocol;
pub mod server;
