pub mod config;
pub mod logging;
pub mod parser;
pub mod store;
pub mod sync;
pub mod version;
