pub mod file_binary_store;
pub mod memory_binary_store;
