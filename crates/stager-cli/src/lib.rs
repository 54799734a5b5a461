//! Library components of the csv-stager CLI.

pub mod logging;
pub mod summary;
