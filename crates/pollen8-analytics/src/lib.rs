pub mod input;
pub mod invite;
pub mod network;
pub mod summary;

pub use input::*;
pub use invite::*;
pub use network::*;
pub use summary::*;

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
