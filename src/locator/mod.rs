//! SegmentLocator: resolves a recording's sidecar files, validates their
//! structure, and yields the ordered phone segments of interest together
//! with the recording's phrase index.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::textgrid::{Interval, IntervalTier, TextGrid};
use crate::types::{RecordingError, Segment, VowelIdentity};

pub const PHONE_TIER: &str = "phone";
pub const WORD_TIER: &str = "word";

/// Which phone-tier intervals become segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// Only labels matching the vowel pattern; consonants and silence are
    /// skipped entirely.
    VowelsOnly,
    /// Every non-silence, non-short-pause label; vowels are decoded and
    /// filtered as usual, consonants are retained undecoded.
    AllPhones,
}

/// Sidecar files resolved next to a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarPaths {
    pub textgrid: PathBuf,
    pub samples: PathBuf,
}

pub fn sidecar_paths(recording: &Path, sample_ext: &str) -> SidecarPaths {
    SidecarPaths {
        textgrid: recording.with_extension("TextGrid"),
        samples: recording.with_extension(sample_ext),
    }
}

/// Derives the 0-based phrase index from the second underscore-separated
/// token of the file stem: "rec_3_foo.wav" -> 2. Phrase numbering in file
/// names is 1-based.
pub fn phrase_index(recording: &Path) -> Result<usize, RecordingError> {
    let invalid = || RecordingError::InvalidFileName(recording.to_path_buf());
    let stem = recording
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(invalid)?;
    let token = stem.split('_').nth(1).ok_or_else(invalid)?;
    let number: usize = token.parse().map_err(|_| invalid())?;
    number.checked_sub(1).ok_or_else(invalid)
}

/// Successful location: the validated segments plus the metadata the sampler
/// and the result record need.
#[derive(Debug, Clone)]
pub struct LocatedSegments {
    pub phrase_index: usize,
    pub segments: Vec<Segment>,
    pub sidecars: SidecarPaths,
}

/// Failed location, still carrying the phrase index when it was derivable so
/// the error record stays attributable.
#[derive(Debug, Clone)]
pub struct LocateFailure {
    pub phrase_index: Option<usize>,
    pub error: RecordingError,
}

pub struct SegmentLocator<'c> {
    config: &'c AnalysisConfig,
}

impl<'c> SegmentLocator<'c> {
    pub fn new(config: &'c AnalysisConfig) -> Self {
        Self { config }
    }

    /// Runs the per-recording validation chain: segmentation file present,
    /// phrase index derivable and within range, phone tier present, sample
    /// sidecar present; then extracts segments per `mode`.
    pub fn locate(
        &self,
        recording: &Path,
        mode: SegmentMode,
        sample_ext: &str,
    ) -> Result<LocatedSegments, LocateFailure> {
        let sidecars = sidecar_paths(recording, sample_ext);
        let phrase = phrase_index(recording);
        let phrase_hint = phrase.as_ref().ok().copied();
        let fail = move |error: RecordingError| LocateFailure {
            phrase_index: phrase_hint,
            error,
        };

        if !sidecars.textgrid.is_file() {
            return Err(fail(RecordingError::MissingSegmentationFile(
                sidecars.textgrid.clone(),
            )));
        }
        let phrase = phrase.map_err(|error| LocateFailure {
            phrase_index: None,
            error,
        })?;
        if phrase > self.config.max_phrase_index {
            return Err(fail(RecordingError::ExcludedPhrase(phrase)));
        }

        let grid =
            TextGrid::open(&sidecars.textgrid).map_err(|err| {
                fail(RecordingError::MalformedSidecar {
                    path: sidecars.textgrid.clone(),
                    detail: err.to_string(),
                })
            })?;
        let phones = grid.tier(PHONE_TIER).ok_or_else(|| {
            fail(RecordingError::MissingTargetTier {
                tier: PHONE_TIER.to_string(),
                path: sidecars.textgrid.clone(),
            })
        })?;
        if !sidecars.samples.is_file() {
            return Err(fail(RecordingError::MissingSampleFile(
                sidecars.samples.clone(),
            )));
        }

        let words = grid.tier(WORD_TIER);
        let segments = match mode {
            SegmentMode::VowelsOnly => self.vowel_segments(phones, words),
            SegmentMode::AllPhones => self.all_phone_segments(phones, words),
        };
        debug!(
            recording = ?recording,
            phrase,
            segments = segments.len(),
            "located segments"
        );
        Ok(LocatedSegments {
            phrase_index: phrase,
            segments,
            sidecars,
        })
    }

    fn vowel_segments(
        &self,
        phones: &IntervalTier,
        words: Option<&IntervalTier>,
    ) -> Vec<Segment> {
        phones
            .intervals
            .iter()
            .filter_map(|interval| {
                let vowel = self.config.vowels.decode(interval.text.trim())?;
                self.qualify_vowel(interval, vowel, words)
            })
            .collect()
    }

    fn all_phone_segments(
        &self,
        phones: &IntervalTier,
        words: Option<&IntervalTier>,
    ) -> Vec<Segment> {
        let mut segments = Vec::new();
        for interval in &phones.intervals {
            let label = interval.text.trim();
            if self.config.silence.is_match(label) || label == self.config.short_pause {
                continue;
            }
            match self.config.vowels.decode(label) {
                Some(vowel) => {
                    if let Some(segment) = self.qualify_vowel(interval, vowel, words) {
                        segments.push(segment);
                    }
                }
                None => segments.push(Segment {
                    start: interval.xmin,
                    end: interval.xmax,
                    label: label.to_string(),
                    vowel: None,
                    word: word_at(words, interval.center()),
                }),
            }
        }
        segments
    }

    /// Applies the cross-cutting vowel filters (duration, stress) and the
    /// AE -> AEN relabel. Returns `None` when the vowel is dropped.
    fn qualify_vowel(
        &self,
        interval: &Interval,
        mut vowel: VowelIdentity,
        words: Option<&IntervalTier>,
    ) -> Option<Segment> {
        let duration = interval.duration();
        if duration < self.config.min_vowel_duration {
            return None;
        }
        // Overlong vowels away from the recording onset are mis-segmentations.
        if duration > self.config.max_vowel_duration && interval.xmin != 0.0 {
            return None;
        }
        if !vowel.has_primary_stress() {
            return None;
        }

        let word = word_at(words, interval.center());
        if vowel.base == "AE" {
            if let Some(word) = word.as_deref() {
                if self.config.is_aen_word(word) {
                    vowel.base = "AEN".to_string();
                }
            }
        }

        Some(Segment {
            start: interval.xmin,
            end: interval.xmax,
            label: interval.text.trim().to_string(),
            vowel: Some(vowel),
            word,
        })
    }
}

fn word_at(words: Option<&IntervalTier>, time: f64) -> Option<String> {
    let interval = words?.label_at(time)?;
    let text = interval.text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
