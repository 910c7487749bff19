pub mod config;
pub mod diagnostics;
pub mod error;
pub mod readings;
pub mod record;
pub mod state;
pub mod summary;
