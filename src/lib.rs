//! bookwheel: reads a Goodreads library export, works out which series you are in the middle of,
//! and weights your to-read shelf so that the next book of an active series comes up first.
//!
//! The series engine lives in [`series`]. [`engine`] wires it to a [`source::BookSource`], and the
//! `commands` module drives it from the CLI, optionally publishing the result to a Google sheet.

mod api;
pub mod args;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod model;
pub mod series;
pub mod source;
#[cfg(test)]
mod test;
mod utils;

pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::Result;
