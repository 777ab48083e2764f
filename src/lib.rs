//! gscreenshot: screenshots through external capture programs
//!
//! This library picks an installed screenshot program (scrot, maim,
//! imlib2_grab, ImageMagick or grim), runs it, and optionally crops the
//! result to an interactively selected region and stamps a cursor on it.

pub mod capture;
pub mod config;
pub mod error;
pub mod model;
pub mod util;
