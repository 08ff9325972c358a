//! GRIB2 grid data source.
//!
//! Decodes one field at one vertical level out of a GRIB2 file using the
//! `grib` crate, and provides a timeout wrapper for any grid data source.

pub mod source;
pub mod timeout;

pub use source::{GribGridSource, ParameterKey};
pub use timeout::TimeoutGridSource;
