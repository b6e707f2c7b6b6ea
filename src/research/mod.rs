pub mod logs;
pub mod sessions;
pub mod tasks;
pub mod types;
