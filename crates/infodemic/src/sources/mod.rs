//! External datasets.
//!
//! Each source parses its raw format into dated [Observation]s, which
//! are aggregated to monthly tables by the pipeline. Observations
//! outside the reporting period are dropped here.
//!
//! [Observation]: crate::month::Observation

pub(crate) mod cases;
pub(crate) mod pageviews;
pub(crate) mod preprints;
pub(crate) mod trends;
