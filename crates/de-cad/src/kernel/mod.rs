//! CAD Kernel abstraction
//!
//! The solid-modeling service behind the builder. Backends:
//! - [`CsgKernel`]: in-process reference kernel (default)
//! - [`TruckKernel`]: pure Rust B-Rep kernel (feature `truck`)
//! - [`NullKernel`]: placeholder that rejects every call

mod csg;
mod session;
mod traits;

#[cfg(feature = "truck")]
mod truck;

pub use csg::{CsgConfig, CsgKernel};
pub use session::KernelSession;
pub use traits::*;

#[cfg(feature = "truck")]
pub use truck::TruckKernel;
