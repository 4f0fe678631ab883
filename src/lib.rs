//! Ringpulse - Audio-reactive rings and sparks
//!
//! Concentric rings breathe in and out while seven sparks pulse to the
//! frequency content of whatever audio file is loaded.

pub mod app;
pub mod audio;
pub mod camera;
pub mod cli;
pub mod frame;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod visualizer;
