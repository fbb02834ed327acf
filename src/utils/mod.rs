pub mod error;
pub mod logger;
pub mod monitor;
pub mod size;
pub mod validation;
