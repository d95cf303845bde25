pub mod client;
pub mod error;
pub mod item;
pub mod link;
