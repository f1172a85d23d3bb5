//! Main module for USFM/ESFM line assembly

pub mod assembling;
pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod esfm;
pub mod markers;
pub mod position;
pub mod reading;
