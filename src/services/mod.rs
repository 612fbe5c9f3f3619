pub mod binary_store;
pub mod credentials;
pub mod items;
pub mod logger;
pub mod parameters;
pub mod transport;
