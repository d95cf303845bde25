pub mod channel;
pub mod discord;
pub mod format;
pub mod service;
