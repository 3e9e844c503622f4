//! Host-side driver for the Coverflow animator.

pub mod cli;
pub mod error;
pub mod output;
pub mod run;
pub mod script;
pub mod snapshot;
pub mod synth;
