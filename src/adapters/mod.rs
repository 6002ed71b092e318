// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "aws")]
pub mod cloudtrail;
pub mod sink;
