pub mod app;
pub mod constants;
pub mod errors;
pub mod managers;
pub mod runner;
pub mod services;
pub mod stores;
pub mod utils;
