// Watermark My Images library

pub mod config;
pub mod logging;
pub mod watermark;
