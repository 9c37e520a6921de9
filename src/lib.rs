#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod api;
pub mod app;
pub mod ask;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod stream;
pub mod timer;
pub mod ui;

pub use config::Config;
pub use error::{ParleyError, Result};
