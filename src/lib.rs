pub mod api;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::engine::SettlementEngine;
pub use crate::core::errors::SplitxError;
pub use crate::core::services::SplitxService;

#[cfg(test)]
mod tests;
