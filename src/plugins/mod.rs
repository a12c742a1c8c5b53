//! Crate-local sub-systems with a stable boundary, so services can depend on
//! them without reaching into their storage details.

pub mod history;
