#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod config;
mod error;
pub mod io;
pub mod optimize;
pub mod paths;
pub mod plan;
pub mod raster;
pub mod svg;
pub mod tasks;
mod utils;

pub use crate::config::{Args, BuildConfig};
pub use crate::error::*;
pub use crate::plan::{Diagnostics, Plan};
pub use crate::raster::{Fit, Rasterizer};
pub use crate::tasks::{Pipeline, TaskId};
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
pub use crate::utils::as_overhead;
