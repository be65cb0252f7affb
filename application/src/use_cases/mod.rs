//! Use cases — application workflows built on the ports.

pub mod load_scripts;
