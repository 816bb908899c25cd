//! Picking episodes from a show library and copying them to a device.
//!
//! The library root holds one directory per show, each with `Season *`
//! directories of episode files. A run takes one or more [`Selection`]s
//! (whole shows or single seasons), interleaves their episodes round-robin so
//! that every selection is represented, and copies compatible episodes until
//! enough have been copied. See [`Copier::run`].

mod copy;
pub mod error;
mod select;

pub use crate::copy::{Copier, Effort, Outcome, Report};
pub use crate::select::{Selection, candidates, interleave};
