//! Core types shared across the phonalyzer measurement pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// A phone-tier interval selected for measurement, annotated with its decoded
/// vowel identity (when it is a vowel) and the orthographic word containing
/// its midpoint (when a word tier is available).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Raw phone label as written in the segmentation, trimmed.
    pub label: String,
    /// Decoded vowel identity; `None` marks a consonant.
    pub vowel: Option<VowelIdentity>,
    /// Word containing the segment midpoint.
    pub word: Option<String>,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Decoded vowel label: "IY1" splits into base "IY" and stress digit '1'.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VowelIdentity {
    pub base: String,
    pub stress: Option<char>,
}

impl VowelIdentity {
    pub fn has_primary_stress(&self) -> bool {
        self.stress == Some('1')
    }
}

/// Vowel/consonant classification used by the all-phones variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneClass {
    Vowel,
    Consonant,
}

impl PhoneClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneClass::Vowel => "vowel",
            PhoneClass::Consonant => "consonant",
        }
    }
}

/// Positional creak profile for one recording.
///
/// One slot per extracted sample, indexed by a running counter across every
/// qualifying vowel of the recording; the counter is never reset between
/// segments. Recordings with fewer qualifying vowels simply record fewer
/// slots, and merging profiles of different lengths leaves the trailing
/// slots' counts untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreakProfile {
    pub scores: Vec<u32>,
    pub counts: Vec<u32>,
}

impl CreakProfile {
    /// Appends one creak measurement at the next slot.
    pub fn push(&mut self, creak: u32) {
        self.scores.push(creak);
        self.counts.push(1);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn creak_sum(&self) -> u64 {
        self.scores.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn sample_sum(&self) -> u64 {
        self.counts.iter().map(|&v| u64::from(v)).sum()
    }

    /// Adds another profile slot-by-slot, growing this one as needed.
    pub fn merge(&mut self, other: &CreakProfile) {
        if other.len() > self.len() {
            self.scores.resize(other.len(), 0);
            self.counts.resize(other.len(), 0);
        }
        for (slot, (&score, &count)) in other.scores.iter().zip(&other.counts).enumerate() {
            self.scores[slot] += score;
            self.counts[slot] += count;
        }
    }

    /// Per-slot creak proportion; slots nothing was recorded at stay `None`
    /// rather than reading as zero creak.
    pub fn proportion_by_slot(&self) -> Vec<Option<f64>> {
        self.scores
            .iter()
            .zip(&self.counts)
            .map(|(&score, &count)| (count > 0).then(|| f64::from(score) / f64::from(count)))
            .collect()
    }
}

/// Per-recording pitch samples: one f0 value and its source frame time per
/// interior step of every qualifying vowel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchTrack {
    pub f0: Vec<f64>,
    pub times: Vec<f64>,
}

impl PitchTrack {
    pub fn push(&mut self, f0: f64, time: f64) {
        self.f0.push(f0);
        self.times.push(time);
    }

    pub fn len(&self) -> usize {
        self.f0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f0.is_empty()
    }
}

/// One row of the flattened per-recording phone timeline. Vowels contribute
/// one row per interior sample; consonants contribute exactly one row with
/// null measurement fields. The slot index runs across the whole recording.
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneSample {
    pub phone: String,
    pub class: PhoneClass,
    /// Decoded (possibly relabeled) base vowel for vowel rows.
    pub vowel: Option<String>,
    pub slot: usize,
    pub time: Option<f64>,
    pub f0: Option<f64>,
    pub f1: Option<f64>,
    pub f2: Option<f64>,
    pub f3: Option<f64>,
    pub f4: Option<f64>,
}

/// Recoverable per-recording failures. None of these abort the batch; they
/// travel inside the recording's [`UtteranceResult`] instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordingError {
    #[error("no segmentation file: {0:?}")]
    MissingSegmentationFile(PathBuf),
    #[error("no {tier} tier in: {path:?}")]
    MissingTargetTier { tier: String, path: PathBuf },
    #[error("no sample file: {0:?}")]
    MissingSampleFile(PathBuf),
    #[error("omitting phrase {0} (beyond the analysis range)")]
    ExcludedPhrase(usize),
    #[error("no sample row covers {time:.4}s in {path:?}")]
    LookupMiss { time: f64, path: PathBuf },
    #[error("cannot derive a phrase index from file name: {0:?}")]
    InvalidFileName(PathBuf),
    #[error("unparseable {field} value at {time:.4}s")]
    BadFieldValue { field: String, time: f64 },
    #[error("malformed sidecar {path:?}: {detail}")]
    MalformedSidecar { path: PathBuf, detail: String },
}

impl RecordingError {
    /// Expected exclusions are suppressed from error reports; everything else
    /// signals a data-quality problem worth triage.
    pub fn is_expected(&self) -> bool {
        matches!(self, RecordingError::ExcludedPhrase(_))
    }
}

/// Per-recording output: either a measurement payload or one recoverable
/// error, never both.
#[derive(Debug, Clone)]
pub struct UtteranceResult<T> {
    pub file: PathBuf,
    /// 0-based phrase index derived from the file name; absent only when the
    /// name itself could not be parsed.
    pub phrase_index: Option<usize>,
    pub outcome: Outcome<T>,
}

#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Measured(T),
    Failed(RecordingError),
}

impl<T> UtteranceResult<T> {
    pub fn measured(file: impl Into<PathBuf>, phrase_index: usize, payload: T) -> Self {
        Self {
            file: file.into(),
            phrase_index: Some(phrase_index),
            outcome: Outcome::Measured(payload),
        }
    }

    pub fn failed(
        file: impl Into<PathBuf>,
        phrase_index: Option<usize>,
        error: RecordingError,
    ) -> Self {
        Self {
            file: file.into(),
            phrase_index,
            outcome: Outcome::Failed(error),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Measured(payload) => Some(payload),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RecordingError> {
        match &self.outcome {
            Outcome::Measured(_) => None,
            Outcome::Failed(error) => Some(error),
        }
    }
}
