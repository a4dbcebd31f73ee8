//! Utility modules for the build pipeline

pub mod fileops;
