// Utility modules

pub mod clipboard;
pub mod detect;
pub mod encode;
pub mod output;
pub mod temp_files;
