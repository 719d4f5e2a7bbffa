#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

//! Turns a live sports broadcast catalog into an XMLTV guide and an M3U8 playlist.

pub mod catalog;
pub mod config;
pub mod epg;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod playlist;
pub mod resolver;
pub mod util;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{Outcome, RunReport, run};
