use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use phonalyzer::analysis;
use phonalyzer::config::{self, AnalysisConfig};
use phonalyzer::corpus::{self, Subject};
use phonalyzer::report;

/// Phonalyzer - corpus voice-quality and pitch measurement tool
///
/// Walks a corpus of segmented recordings, resamples each qualifying phone
/// into evenly spaced acoustic measurements, and writes per-speaker and
/// per-phrase aggregate tables.
#[derive(Parser, Debug)]
#[command(name = "phonalyzer")]
#[command(version, about = "Creak and pitch measurement over a segmented speech corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tabulate creak proportion by speaker and by phrase.
    Creak(CreakArgs),
    /// Extract per-vowel pitch samples and aggregate contours by phrase.
    Pitch(CorpusArgs),
    /// Dump the flattened per-phone sample timeline for every recording.
    Phones(CorpusArgs),
}

#[derive(Args, Debug, Clone)]
struct CorpusArgs {
    /// Corpus root directory (contains the data subdirectory and subjects.txt)
    #[arg(long = "corpus-dir", value_name = "DIR")]
    corpus_dir: PathBuf,

    /// Subjects table path (defaults to <corpus-dir>/subjects.txt)
    #[arg(long, value_name = "PATH")]
    subjects: Option<PathBuf>,

    /// Directory where CSV tables are written
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Number of equal increments each vowel is divided into (yields one
    /// fewer measurement per vowel)
    #[arg(long)]
    steps: Option<usize>,

    /// Optional JSON file overriding the analysis constants
    #[arg(long = "config-file", value_name = "PATH")]
    config_file: Option<PathBuf>,
}

impl CorpusArgs {
    fn build_config(&self, default_steps: usize) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::new(&self.corpus_dir, default_steps)?;
        if let Some(path) = &self.config_file {
            let overrides = config::load_overrides(path)?;
            config.apply_overrides(&overrides)?;
        }
        // The command line wins over the override file.
        if let Some(steps) = self.steps {
            config.set_steps(steps)?;
        }
        Ok(config)
    }

    fn subjects_path(&self) -> PathBuf {
        self.subjects
            .clone()
            .unwrap_or_else(|| self.corpus_dir.join("subjects.txt"))
    }

    fn read_subject_ids(&self, filter: impl Fn(&Subject) -> bool) -> Result<Vec<String>> {
        let subjects = corpus::read_subjects(&self.subjects_path())?;
        Ok(subjects
            .into_iter()
            .filter(|subject| filter(subject))
            .map(|subject| subject.random_id)
            .collect())
    }

    fn prepare_out_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create output directory {:?}", self.out_dir))
    }
}

#[derive(Args, Debug, Clone)]
struct CreakArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Restrict processing to California subjects (adminAreaLevel1 of
    /// "California" or "CA")
    #[arg(long = "california-only")]
    california_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Creak(args) => run_creak(args),
        Command::Pitch(args) => run_pitch(args),
        Command::Phones(args) => run_phones(args),
    }
}

fn run_creak(args: CreakArgs) -> Result<()> {
    let config = args.corpus.build_config(6)?;
    let ids = args.corpus.read_subject_ids(|subject| {
        !args.california_only || subject.is_californian()
    })?;
    info!(subjects = ids.len(), steps = config.nsteps, "starting creak analysis");

    let results = analysis::process_speakers(&config, &ids, analysis::creak_score)?;
    let errors = report::report_errors(&results);
    if errors > 0 {
        info!(errors, "recordings skipped due to data problems");
    }

    args.corpus.prepare_out_dir()?;
    let by_subject = report::creak_by_subject(&results);
    let subject_csv = args.corpus.out_dir.join("creakinessBySubject.csv");
    report::write_creak_by_subject(&subject_csv, &by_subject)?;

    let by_phrase = report::creak_by_phrase(&results);
    let phrase_csv = args.corpus.out_dir.join("creakinessBySentence.csv");
    report::write_creak_by_phrase(&phrase_csv, &by_phrase, &config)?;

    info!(subject_csv = ?subject_csv, phrase_csv = ?phrase_csv, "wrote creak tables");
    Ok(())
}

fn run_pitch(args: CorpusArgs) -> Result<()> {
    let config = args.build_config(4)?;
    let ids = args.read_subject_ids(|_| true)?;
    info!(subjects = ids.len(), steps = config.nsteps, "starting pitch analysis");

    let results = analysis::process_speakers(&config, &ids, analysis::pitch_contour)?;
    let errors = report::report_errors(&results);
    if errors > 0 {
        info!(errors, "recordings skipped due to data problems");
    }

    args.prepare_out_dir()?;
    let contours = report::pitch_contours_by_phrase(&results);
    let contours_csv = args.out_dir.join("pitchContoursByPhrase.csv");
    report::write_pitch_contours(&contours_csv, &contours, &config)?;

    info!(contours_csv = ?contours_csv, "wrote pitch contour table");
    Ok(())
}

fn run_phones(args: CorpusArgs) -> Result<()> {
    let config = args.build_config(4)?;
    let ids = args.read_subject_ids(|_| true)?;
    info!(subjects = ids.len(), steps = config.nsteps, "starting phone analysis");

    let results = analysis::process_speakers(&config, &ids, analysis::phone_samples)?;
    let errors = report::report_errors(&results);
    if errors > 0 {
        info!(errors, "recordings skipped due to data problems");
    }

    args.prepare_out_dir()?;
    let samples_csv = args.out_dir.join("phoneSamples.csv");
    report::write_phone_samples(&samples_csv, &results)?;

    info!(samples_csv = ?samples_csv, "wrote phone sample table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_creak_subcommand() {
        let cli = Cli::try_parse_from([
            "phonalyzer",
            "creak",
            "--corpus-dir",
            "/data/corpus",
            "--steps",
            "6",
            "--california-only",
        ])
        .unwrap();
        let Command::Creak(args) = cli.command else {
            panic!("expected creak subcommand");
        };
        assert!(args.california_only);
        assert_eq!(args.corpus.steps, Some(6));
        assert_eq!(
            args.corpus.subjects_path(),
            PathBuf::from("/data/corpus/subjects.txt")
        );
    }

    #[test]
    fn pitch_defaults_output_to_cwd() {
        let cli =
            Cli::try_parse_from(["phonalyzer", "pitch", "--corpus-dir", "/data/corpus"]).unwrap();
        let Command::Pitch(args) = cli.command else {
            panic!("expected pitch subcommand");
        };
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.steps, None);
    }
}
