mod bus_types;
mod case;
mod dc;
mod error;
mod loadcase;
mod lu;
mod network;
mod order;
mod ptdf;
mod sfopt;
mod traits;

pub mod debug;
pub mod dense;
pub mod diagnostics;

#[cfg(test)]
mod tests;

pub use bus_types::*;
pub use case::*;
pub use dc::*;
pub use error::*;
pub use loadcase::*;
pub use lu::*;
pub use network::*;
pub use order::*;
pub use ptdf::*;
pub use sfopt::*;
pub use traits::*;
