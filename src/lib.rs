//! tickwatch - rotating market price ticker with price alerts
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use domain::alert::AlertEngine;
pub use domain::price::{FetchEngine, PriceFeed};
pub use domain::rotation::RotationEngine;
pub use domain::state::SharedState;
pub use application::supervisor::ConfigReloadSupervisor;
