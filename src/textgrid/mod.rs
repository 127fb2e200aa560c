//! Reader for Praat TextGrid segmentation files (long text format).
//!
//! Only interval tiers are retained; point tiers are skipped. Lookup is by
//! tier name and by timestamp within a tier.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

/// One labeled time interval within a tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub xmin: f64,
    pub xmax: f64,
    pub text: String,
}

impl Interval {
    pub fn duration(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn center(&self) -> f64 {
        (self.xmin + self.xmax) / 2.0
    }
}

/// A named track of labeled intervals ("phone", "word", ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalTier {
    pub name: String,
    pub intervals: Vec<Interval>,
}

impl IntervalTier {
    /// Interval whose window `[xmin, xmax)` contains `time`. The final
    /// interval's end boundary is treated as inclusive so a query at the very
    /// end of the recording still resolves.
    pub fn label_at(&self, time: f64) -> Option<&Interval> {
        if let Some(hit) = self
            .intervals
            .iter()
            .find(|iv| time >= iv.xmin && time < iv.xmax)
        {
            return Some(hit);
        }
        self.intervals.last().filter(|iv| time == iv.xmax)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextGrid {
    tiers: Vec<IntervalTier>,
}

impl TextGrid {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read TextGrid {path:?}"))?;
        Self::parse(&data).with_context(|| format!("malformed TextGrid {path:?}"))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let mut lines = data.lines().enumerate();
        let header = lines
            .by_ref()
            .find(|(_, line)| !line.trim().is_empty())
            .map(|(_, line)| line)
            .ok_or_else(|| anyhow!("empty file"))?;
        if !header.contains("ooTextFile") {
            bail!("missing ooTextFile header");
        }

        let mut parser = Parser::default();
        for (idx, line) in lines {
            parser
                .feed(line.trim())
                .with_context(|| format!("line {}", idx + 1))?;
        }
        Ok(Self {
            tiers: parser.finish()?,
        })
    }

    pub fn tier(&self, name: &str) -> Option<&IntervalTier> {
        self.tiers.iter().find(|tier| tier.name == name)
    }

    pub fn tiers(&self) -> &[IntervalTier] {
        &self.tiers
    }
}

/// Line-by-line state for the long TextGrid format. Tier-level xmin/xmax
/// lines are ignored; only values following an `intervals [k]:` header are
/// collected into intervals.
#[derive(Default)]
struct Parser {
    tiers: Vec<IntervalTier>,
    current: Option<IntervalTier>,
    in_interval: bool,
    xmin: Option<f64>,
    xmax: Option<f64>,
    text: Option<String>,
}

impl Parser {
    fn feed(&mut self, line: &str) -> Result<()> {
        if let Some(value) = key_value(line, "class") {
            self.flush_interval()?;
            self.flush_tier();
            if unquote(value) == "IntervalTier" {
                self.current = Some(IntervalTier::default());
            }
            return Ok(());
        }
        if let Some(value) = key_value(line, "name") {
            if let Some(tier) = self.current.as_mut() {
                if tier.name.is_empty() {
                    tier.name = unquote(value);
                }
            }
            return Ok(());
        }
        if line.starts_with("intervals") && line.contains('[') {
            self.flush_interval()?;
            self.in_interval = self.current.is_some();
            return Ok(());
        }
        if line.starts_with("item") {
            self.flush_interval()?;
            return Ok(());
        }
        if !self.in_interval {
            return Ok(());
        }
        if let Some(value) = key_value(line, "xmin") {
            self.xmin = Some(parse_time(value)?);
        } else if let Some(value) = key_value(line, "xmax") {
            self.xmax = Some(parse_time(value)?);
        } else if let Some(value) = key_value(line, "text") {
            self.text = Some(unquote(value));
        }
        Ok(())
    }

    fn flush_interval(&mut self) -> Result<()> {
        if !self.in_interval {
            return Ok(());
        }
        match (self.xmin.take(), self.xmax.take(), self.text.take()) {
            (Some(xmin), Some(xmax), Some(text)) => {
                if let Some(tier) = self.current.as_mut() {
                    tier.intervals.push(Interval { xmin, xmax, text });
                }
            }
            (None, None, None) => {}
            _ => bail!("incomplete interval (expected xmin, xmax, and text)"),
        }
        Ok(())
    }

    fn flush_tier(&mut self) {
        self.in_interval = false;
        if let Some(tier) = self.current.take() {
            self.tiers.push(tier);
        }
    }

    fn finish(mut self) -> Result<Vec<IntervalTier>> {
        // A trailing interval without a closing marker still counts.
        self.flush_interval()?;
        self.flush_tier();
        Ok(self.tiers)
    }
}

fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.trim_start();
    let rest = rest.strip_prefix('=')?;
    Some(rest.trim())
}

fn parse_time(value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("invalid time value {value:?}"))
}

fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    // Praat escapes embedded quotes by doubling them.
    inner.replace("\"\"", "\"")
}
