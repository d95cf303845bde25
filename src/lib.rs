pub mod canvas;
pub mod config;
pub mod logging;
pub mod notifications;
pub mod scheduler;
pub mod store;
