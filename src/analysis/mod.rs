//! Per-recording analysis pipelines and the per-speaker fan-out.
//!
//! Each variant pairs the locator with the sampler over a specific sidecar
//! schema. Recordings are processed sequentially within a speaker; speakers
//! are an embarrassingly parallel map with no shared mutable state.

use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::corpus;
use crate::locator::{SegmentLocator, SegmentMode};
use crate::sampler::SegmentSampler;
use crate::table::SampleTable;
use crate::types::{
    CreakProfile, PhoneSample, PitchTrack, RecordingError, Segment, UtteranceResult,
};

pub const CREAK_EXTENSION: &str = "creak";
pub const CREAK_FIELDS: &str = "t1,score,creak";
pub const FORMANT_EXTENSION: &str = "fb";
pub const FORMANT_FIELDS: &str = "t1,rms,f1,f2,f3,f4,f0";
/// Formant sidecars carry frame times in milliseconds.
pub const FORMANT_TIME_SCALE: f64 = 0.001;

/// Creak variant: positional creak profile over the qualifying vowels.
pub fn creak_score(config: &AnalysisConfig, recording: &Path) -> UtteranceResult<CreakProfile> {
    run_recording(
        config,
        recording,
        SegmentMode::VowelsOnly,
        CREAK_EXTENSION,
        CREAK_FIELDS,
        1.0,
        |sampler, segments| {
            let mut profile = CreakProfile::default();
            for segment in segments {
                sampler.accumulate_creak(segment, &mut profile)?;
            }
            Ok(profile)
        },
    )
}

/// Pitch variant: f0 samples (and frame times) over the qualifying vowels.
pub fn pitch_contour(config: &AnalysisConfig, recording: &Path) -> UtteranceResult<PitchTrack> {
    run_recording(
        config,
        recording,
        SegmentMode::VowelsOnly,
        FORMANT_EXTENSION,
        FORMANT_FIELDS,
        FORMANT_TIME_SCALE,
        |sampler, segments| {
            let mut track = PitchTrack::default();
            for segment in segments {
                sampler.extend_pitch(segment, &mut track)?;
            }
            Ok(track)
        },
    )
}

/// All-phones variant: flattened per-phone timeline with f0-f4 on vowels and
/// null measurement rows on consonants.
pub fn phone_samples(
    config: &AnalysisConfig,
    recording: &Path,
) -> UtteranceResult<Vec<PhoneSample>> {
    run_recording(
        config,
        recording,
        SegmentMode::AllPhones,
        FORMANT_EXTENSION,
        FORMANT_FIELDS,
        FORMANT_TIME_SCALE,
        |sampler, segments| {
            let mut rows = Vec::new();
            for segment in segments {
                sampler.extend_phone_rows(segment, &mut rows)?;
            }
            Ok(rows)
        },
    )
}

fn run_recording<T>(
    config: &AnalysisConfig,
    recording: &Path,
    mode: SegmentMode,
    sample_ext: &str,
    fields: &str,
    time_scale: f64,
    extract: impl FnOnce(&SegmentSampler, &[Segment]) -> Result<T, RecordingError>,
) -> UtteranceResult<T> {
    let locator = SegmentLocator::new(config);
    let located = match locator.locate(recording, mode, sample_ext) {
        Ok(located) => located,
        Err(failure) => {
            return UtteranceResult::failed(recording, failure.phrase_index, failure.error)
        }
    };

    let mut table = match SampleTable::open(&located.sidecars.samples, fields) {
        Ok(table) => table,
        Err(err) => {
            return UtteranceResult::failed(
                recording,
                Some(located.phrase_index),
                RecordingError::MalformedSidecar {
                    path: located.sidecars.samples.clone(),
                    detail: err.to_string(),
                },
            )
        }
    };
    if time_scale != 1.0 {
        table.scale_by(time_scale);
    }

    let sampler = SegmentSampler::new(&table, config.nsteps);
    match extract(&sampler, &located.segments) {
        Ok(payload) => UtteranceResult::measured(recording, located.phrase_index, payload),
        Err(err) => UtteranceResult::failed(recording, Some(located.phrase_index), err),
    }
}

/// All results for one speaker, in recording order.
#[derive(Debug, Clone)]
pub struct SpeakerResults<T> {
    pub random_id: String,
    pub results: Vec<UtteranceResult<T>>,
}

/// Processes every recording of one speaker sequentially.
pub fn process_speaker<T>(
    config: &AnalysisConfig,
    random_id: &str,
    per_recording: impl Fn(&AnalysisConfig, &Path) -> UtteranceResult<T>,
) -> Result<SpeakerResults<T>> {
    info!(subject = %random_id, "processing subject");
    let recordings = corpus::recordings_for_speaker(&config.data_dir, random_id)?;
    let results = recordings
        .iter()
        .map(|recording| per_recording(config, recording))
        .collect();
    Ok(SpeakerResults {
        random_id: random_id.to_string(),
        results,
    })
}

/// Parallel map over speakers. Completion order is irrelevant; callers
/// re-sort and group results afterwards.
pub fn process_speakers<T, F>(
    config: &AnalysisConfig,
    random_ids: &[String],
    per_recording: F,
) -> Result<Vec<SpeakerResults<T>>>
where
    T: Send,
    F: Fn(&AnalysisConfig, &Path) -> UtteranceResult<T> + Sync,
{
    random_ids
        .par_iter()
        .map(|random_id| process_speaker(config, random_id, &per_recording))
        .collect()
}
