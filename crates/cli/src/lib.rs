//! Plume build CLI library.

pub mod cli;
