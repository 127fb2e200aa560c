//! Aggregation of per-recording results into corpus-level tables, CSV
//! export, and the data-quality error summary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::analysis::SpeakerResults;
use crate::config::AnalysisConfig;
use crate::types::{CreakProfile, PhoneSample, PitchTrack};

/// Running creak totals for one grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreakTotals {
    pub creak_sum: u64,
    pub sample_sum: u64,
}

impl CreakTotals {
    pub fn add(&mut self, profile: &CreakProfile) {
        self.creak_sum += profile.creak_sum();
        self.sample_sum += profile.sample_sum();
    }

    /// `None` when no samples were recorded for this key; groups without
    /// data must not read as creak-free.
    pub fn creak_prop(&self) -> Option<f64> {
        (self.sample_sum > 0).then(|| self.creak_sum as f64 / self.sample_sum as f64)
    }
}

/// Creak totals grouped by speaker, sorted by proportion descending.
pub fn creak_by_subject(results: &[SpeakerResults<CreakProfile>]) -> Vec<(String, CreakTotals)> {
    let mut rows: Vec<(String, CreakTotals)> = results
        .iter()
        .map(|speaker| {
            let mut totals = CreakTotals::default();
            for result in &speaker.results {
                if let Some(profile) = result.payload() {
                    totals.add(profile);
                }
            }
            (speaker.random_id.clone(), totals)
        })
        .collect();
    sort_by_proportion(&mut rows);
    rows
}

/// Creak totals grouped by phrase index, sorted by proportion descending.
pub fn creak_by_phrase(results: &[SpeakerResults<CreakProfile>]) -> Vec<(usize, CreakTotals)> {
    let mut by_phrase: BTreeMap<usize, CreakTotals> = BTreeMap::new();
    for speaker in results {
        for result in &speaker.results {
            let (Some(phrase), Some(profile)) = (result.phrase_index, result.payload()) else {
                continue;
            };
            by_phrase.entry(phrase).or_default().add(profile);
        }
    }
    let mut rows: Vec<(usize, CreakTotals)> = by_phrase.into_iter().collect();
    sort_by_proportion(&mut rows);
    rows
}

fn sort_by_proportion<K>(rows: &mut [(K, CreakTotals)]) {
    rows.sort_by(|a, b| {
        let a = a.1.creak_prop().unwrap_or(f64::NEG_INFINITY);
        let b = b.1.creak_prop().unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}

/// Mean f0 at one ordinal sample position within a phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPoint {
    pub position: usize,
    pub mean_f0: f64,
    pub samples: usize,
}

/// Positional mean pitch contour per phrase. Recordings contribute to a
/// position only when they actually recorded a sample there; positions with
/// no contributors are dropped, never divided.
pub fn pitch_contours_by_phrase(
    results: &[SpeakerResults<PitchTrack>],
) -> BTreeMap<usize, Vec<ContourPoint>> {
    let mut sums: BTreeMap<usize, (Vec<f64>, Vec<usize>)> = BTreeMap::new();
    for speaker in results {
        for result in &speaker.results {
            let (Some(phrase), Some(track)) = (result.phrase_index, result.payload()) else {
                continue;
            };
            let (totals, counts) = sums.entry(phrase).or_default();
            for (position, &f0) in track.f0.iter().enumerate() {
                if totals.len() <= position {
                    totals.resize(position + 1, 0.0);
                    counts.resize(position + 1, 0);
                }
                totals[position] += f0;
                counts[position] += 1;
            }
        }
    }

    sums.into_iter()
        .map(|(phrase, (totals, counts))| {
            let contour = totals
                .iter()
                .zip(&counts)
                .enumerate()
                .filter(|(_, (_, &count))| count > 0)
                .map(|(position, (&total, &count))| ContourPoint {
                    position,
                    mean_f0: total / count as f64,
                    samples: count,
                })
                .collect();
            (phrase, contour)
        })
        .collect()
}

/// Logs every non-expected per-recording error for manual triage and returns
/// how many were reported. Excluded phrases are suppressed.
pub fn report_errors<T>(results: &[SpeakerResults<T>]) -> usize {
    let mut reported = 0;
    for speaker in results {
        for result in &speaker.results {
            let Some(error) = result.error() else { continue };
            if error.is_expected() {
                continue;
            }
            warn!(
                subject = %speaker.random_id,
                file = ?result.file,
                error = %error,
                "recording failed"
            );
            reported += 1;
        }
    }
    reported
}

pub fn write_creak_by_subject(path: &Path, rows: &[(String, CreakTotals)]) -> Result<()> {
    let mut out = csv_writer(path)?;
    writeln!(out, "random_id,creakSum,sampleSum,creakProp")?;
    for (random_id, totals) in rows {
        writeln!(
            out,
            "{},{},{},{}",
            csv_field(random_id),
            totals.creak_sum,
            totals.sample_sum,
            format_proportion(totals.creak_prop())
        )?;
    }
    Ok(())
}

pub fn write_creak_by_phrase(
    path: &Path,
    rows: &[(usize, CreakTotals)],
    config: &AnalysisConfig,
) -> Result<()> {
    let mut out = csv_writer(path)?;
    writeln!(out, "phraseIndex,utterance,creakSum,sampleSum,creakProp")?;
    for (phrase, totals) in rows {
        writeln!(
            out,
            "{},{},{},{},{}",
            phrase,
            csv_field(config.utterance_text(*phrase).unwrap_or("")),
            totals.creak_sum,
            totals.sample_sum,
            format_proportion(totals.creak_prop())
        )?;
    }
    Ok(())
}

pub fn write_pitch_contours(
    path: &Path,
    contours: &BTreeMap<usize, Vec<ContourPoint>>,
    config: &AnalysisConfig,
) -> Result<()> {
    let mut out = csv_writer(path)?;
    writeln!(out, "phraseIndex,utterance,position,meanF0,samples")?;
    for (phrase, contour) in contours {
        let utterance = csv_field(config.utterance_text(*phrase).unwrap_or(""));
        for point in contour {
            writeln!(
                out,
                "{},{},{},{:.3},{}",
                phrase, utterance, point.position, point.mean_f0, point.samples
            )?;
        }
    }
    Ok(())
}

pub fn write_phone_samples(
    path: &Path,
    results: &[SpeakerResults<Vec<PhoneSample>>],
) -> Result<()> {
    let mut out = csv_writer(path)?;
    writeln!(
        out,
        "random_id,file,phraseIndex,slot,phone,class,vowel,time,f0,f1,f2,f3,f4"
    )?;
    for speaker in results {
        for result in &speaker.results {
            let (Some(phrase), Some(rows)) = (result.phrase_index, result.payload()) else {
                continue;
            };
            for row in rows {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                    csv_field(&speaker.random_id),
                    csv_field(&result.file.to_string_lossy()),
                    phrase,
                    row.slot,
                    csv_field(&row.phone),
                    row.class.as_str(),
                    csv_field(row.vowel.as_deref().unwrap_or("")),
                    format_optional(row.time),
                    format_optional(row.f0),
                    format_optional(row.f1),
                    format_optional(row.f2),
                    format_optional(row.f3),
                    format_optional(row.f4),
                )?;
            }
        }
    }
    Ok(())
}

fn csv_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    Ok(BufWriter::new(file))
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn format_proportion(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}
