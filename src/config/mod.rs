//! Analysis configuration: study constants with externally settable overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::types::VowelIdentity;

/// ARPABET vowel inventory recognized by the default matching pattern.
/// AXR must precede AX so the longer symbol wins the alternation.
pub const DEFAULT_VOWEL_INVENTORY: [&str; 19] = [
    "AA", "AE", "AH", "AO", "AW", "AXR", "AX", "AY", "EH", "ER", "EY", "IH", "IX", "IY", "OW",
    "OY", "UH", "UW", "UX",
];

/// The seven fixed stimulus sentences, indexed by phrase index.
pub const DEFAULT_UTTERANCES: [&str; 7] = [
    "Go Bears",
    "Dawn found it odd that Judd did a hand stand.",
    "She had your dark suit in greasy wash water all year.",
    "Who said you should hold such an awkward pose?",
    "Don was awed by the hat rack.",
    "This wheel's red spokes show why mud is no boon.",
    "Ten plus one equals eleven and two plus six equals eight.",
];

/// Words triggering the AE -> AEN relabel (pre-nasal split).
pub const DEFAULT_AEN_WORDS: [&str; 2] = ["HAND", "STAND"];

pub const DEFAULT_DATA_SUBDIR: &str = "voicesof_data";
pub const DEFAULT_MAX_PHRASE_INDEX: usize = 5;
pub const DEFAULT_MIN_VOWEL_DURATION: f64 = 0.029;
pub const DEFAULT_MAX_VOWEL_DURATION: f64 = 1.0;
pub const DEFAULT_SHORT_PAUSE_LABEL: &str = "sp";
const DEFAULT_SILENCE_PATTERN: &str = r"^\s*$|^(?i:sil)$";

static DEFAULT_SILENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_SILENCE_PATTERN).expect("default silence pattern compiles")
});
static DEFAULT_VOWELS: Lazy<VowelPattern> = Lazy::new(|| {
    VowelPattern::from_inventory(&DEFAULT_VOWEL_INVENTORY)
        .expect("default vowel inventory compiles")
});

/// Compiled vowel label matcher built from a symbol inventory. A label either
/// decodes to a base symbol plus optional stress digit or it does not match;
/// no label produces a parse error.
#[derive(Debug, Clone)]
pub struct VowelPattern {
    regex: Regex,
}

impl VowelPattern {
    pub fn from_inventory<S: AsRef<str>>(symbols: &[S]) -> Result<Self> {
        ensure!(!symbols.is_empty(), "vowel inventory must not be empty");
        let alternation = symbols
            .iter()
            .map(|s| regex::escape(s.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("^(?P<vowel>{alternation})(?P<stress>\\d)?$"))
            .context("failed to compile vowel pattern from inventory")?;
        Ok(Self { regex })
    }

    /// Splits a label like "IY1" into base "IY" and stress '1'. Returns
    /// `None` for consonants, silence, and anything else outside the
    /// inventory.
    pub fn decode(&self, label: &str) -> Option<VowelIdentity> {
        let caps = self.regex.captures(label)?;
        let base = caps.name("vowel")?.as_str().to_string();
        let stress = caps.name("stress").and_then(|m| m.as_str().chars().next());
        Some(VowelIdentity { base, stress })
    }
}

/// All study constants threaded through the pipeline. Nothing in the core
/// reads module-level state; every knob lives here.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub corpus_root: PathBuf,
    /// Directory holding the per-recording wav files and sidecars.
    pub data_dir: PathBuf,
    /// Number of equal increments each vowel is divided into; a segment
    /// yields nsteps - 1 interior samples.
    pub nsteps: usize,
    pub vowels: VowelPattern,
    pub silence: Regex,
    pub short_pause: String,
    /// Phrase indices above this are excluded (index 5 is the last stimulus
    /// sentence of interest; 6 is the math phrase).
    pub max_phrase_index: usize,
    pub min_vowel_duration: f64,
    pub max_vowel_duration: f64,
    pub utterances: Vec<String>,
    pub aen_words: Vec<String>,
}

impl AnalysisConfig {
    pub fn new(corpus_root: impl Into<PathBuf>, nsteps: usize) -> Result<Self> {
        ensure!(nsteps >= 2, "step count must be at least 2 (got {nsteps})");
        let corpus_root = corpus_root.into();
        let data_dir = corpus_root.join(DEFAULT_DATA_SUBDIR);
        Ok(Self {
            corpus_root,
            data_dir,
            nsteps,
            vowels: DEFAULT_VOWELS.clone(),
            silence: DEFAULT_SILENCE.clone(),
            short_pause: DEFAULT_SHORT_PAUSE_LABEL.to_string(),
            max_phrase_index: DEFAULT_MAX_PHRASE_INDEX,
            min_vowel_duration: DEFAULT_MIN_VOWEL_DURATION,
            max_vowel_duration: DEFAULT_MAX_VOWEL_DURATION,
            utterances: DEFAULT_UTTERANCES.iter().map(|s| s.to_string()).collect(),
            aen_words: DEFAULT_AEN_WORDS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn set_steps(&mut self, nsteps: usize) -> Result<()> {
        ensure!(nsteps >= 2, "step count must be at least 2 (got {nsteps})");
        self.nsteps = nsteps;
        Ok(())
    }

    pub fn utterance_text(&self, phrase_index: usize) -> Option<&str> {
        self.utterances.get(phrase_index).map(String::as_str)
    }

    pub fn is_aen_word(&self, word: &str) -> bool {
        self.aen_words
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(word))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(subdir) = &overrides.data_subdir {
            self.data_dir = self.corpus_root.join(subdir);
        }
        if let Some(nsteps) = overrides.nsteps {
            self.set_steps(nsteps)?;
        }
        if let Some(inventory) = &overrides.vowel_inventory {
            self.vowels = VowelPattern::from_inventory(inventory)?;
        }
        if let Some(utterances) = &overrides.utterances {
            ensure!(
                !utterances.is_empty(),
                "utterance table override must not be empty"
            );
            self.utterances = utterances.clone();
        }
        if let Some(words) = &overrides.aen_words {
            self.aen_words = words.clone();
        }
        if let Some(index) = overrides.max_phrase_index {
            self.max_phrase_index = index;
        }
        if let Some(duration) = overrides.min_vowel_duration {
            ensure!(duration >= 0.0, "minimum vowel duration must be >= 0");
            self.min_vowel_duration = duration;
        }
        if let Some(duration) = overrides.max_vowel_duration {
            ensure!(
                duration > self.min_vowel_duration,
                "maximum vowel duration must exceed the minimum"
            );
            self.max_vowel_duration = duration;
        }
        if let Some(label) = &overrides.short_pause {
            self.short_pause = label.clone();
        }
        Ok(())
    }
}

/// Optional JSON overrides for the study constants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub data_subdir: Option<String>,
    #[serde(default, alias = "steps")]
    pub nsteps: Option<usize>,
    #[serde(default)]
    pub vowel_inventory: Option<Vec<String>>,
    #[serde(default)]
    pub utterances: Option<Vec<String>>,
    #[serde(default)]
    pub aen_words: Option<Vec<String>>,
    #[serde(default)]
    pub max_phrase_index: Option<usize>,
    #[serde(default)]
    pub min_vowel_duration: Option<f64>,
    #[serde(default)]
    pub max_vowel_duration: Option<f64>,
    #[serde(default)]
    pub short_pause: Option<String>,
}

pub fn load_overrides(path: &Path) -> Result<ConfigOverrides> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {path:?}"))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse config file {path:?}"))
}
