//! Rig implementations.

pub mod headless;
