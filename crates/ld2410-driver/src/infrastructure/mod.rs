//! Infrastructure layer: concrete byte transport adapters.

pub mod transport;
