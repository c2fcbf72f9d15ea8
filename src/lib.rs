pub mod backends;
pub mod bench;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod logger;
pub mod report;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
