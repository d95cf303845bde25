pub mod detector;
pub mod report;
pub mod service;
