//! pi-core: shared foundation for the PI loop simulator.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers + sample grids)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{PiError, PiResult};
pub use numeric::*;
