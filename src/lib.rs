//! Distributed coordination core for a four-player Hearts ring
//! protocol over UDP: each peer forwards every frame around a fixed
//! ring, processing the ones addressed to it and relaying the rest
//! unmodified.

pub mod app;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod phase;
pub mod protocol;
pub mod rules;
pub mod strategy;
pub mod token;
pub mod transport;

pub use error::{Error, Result};
