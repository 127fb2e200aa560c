//! Phonalyzer extracts acoustic measurements (creak flags, pitch and formant
//! trajectories) from segmented speech recordings and aggregates them per
//! speaker and per phrase.
//!
//! The core is the pairing of [`locator::SegmentLocator`] (sidecar
//! resolution, validation, segment filtering) with
//! [`sampler::SegmentSampler`] (fixed-count resampling of each segment and
//! accumulation of the extracted values). Everything else — discovery,
//! parallel fan-out, CSV export — is glue around that pair.

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod locator;
pub mod report;
pub mod sampler;
pub mod table;
pub mod textgrid;
pub mod types;
