//! Numerical core shared by the rod engine and the validation layer.
//!
//! - `math`: fixed-size vectors and matrices for rod state
//! - `jidoka`: stop-on-error inspection of rod state during integration

pub mod jidoka;
pub mod math;

pub use jidoka::{JidokaConfig, JidokaGuard};
pub use math::{Mat3, Vec3};
