//! Internal utility modules for the campaign-core crate.

pub(crate) mod logger;

pub use logger::setup_logger;
