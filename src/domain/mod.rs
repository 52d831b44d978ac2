//! Domain layer - monitor state and the engines working on it

pub mod alert;
pub mod price;
pub mod rotation;
pub mod sink;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
