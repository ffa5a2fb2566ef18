pub mod config;
pub mod models;
pub mod token;
pub mod utils;

pub use config::*;
pub use utils::*;
