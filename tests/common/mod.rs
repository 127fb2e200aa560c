//! Shared fixture builders for the integration tests: long-format TextGrids
//! and sample-table sidecars written to temporary corpus directories.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub type Tier<'a> = (&'a str, Vec<(f64, f64, &'a str)>);

/// Renders tiers in the long TextGrid format Praat writes by default.
pub fn textgrid_text(tiers: &[Tier]) -> String {
    let xmax = tiers
        .iter()
        .flat_map(|(_, intervals)| intervals.iter().map(|iv| iv.1))
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    out.push_str("File type = \"ooTextFile\"\n");
    out.push_str("Object class = \"TextGrid\"\n\n");
    let _ = writeln!(out, "xmin = 0");
    let _ = writeln!(out, "xmax = {xmax}");
    out.push_str("tiers? <exists>\n");
    let _ = writeln!(out, "size = {}", tiers.len());
    out.push_str("item []:\n");
    for (tier_idx, (name, intervals)) in tiers.iter().enumerate() {
        let _ = writeln!(out, "    item [{}]:", tier_idx + 1);
        out.push_str("        class = \"IntervalTier\"\n");
        let _ = writeln!(out, "        name = \"{name}\"");
        let _ = writeln!(out, "        xmin = 0");
        let _ = writeln!(out, "        xmax = {xmax}");
        let _ = writeln!(out, "        intervals: size = {}", intervals.len());
        for (iv_idx, (xmin, xmax, text)) in intervals.iter().enumerate() {
            let _ = writeln!(out, "        intervals [{}]:", iv_idx + 1);
            let _ = writeln!(out, "            xmin = {xmin}");
            let _ = writeln!(out, "            xmax = {xmax}");
            let _ = writeln!(out, "            text = \"{text}\"");
        }
    }
    out
}

/// Creates an (empty) wav file for a recording; the analyses never decode
/// audio, they only key off the file name.
pub fn touch_wav(dir: &Path, stem: &str) -> PathBuf {
    let path = dir.join(format!("{stem}.wav"));
    fs::write(&path, b"").unwrap();
    path
}

pub fn write_textgrid(dir: &Path, stem: &str, tiers: &[Tier]) {
    fs::write(dir.join(format!("{stem}.TextGrid")), textgrid_text(tiers)).unwrap();
}

pub fn write_sidecar(dir: &Path, stem: &str, ext: &str, content: &str) {
    fs::write(dir.join(format!("{stem}.{ext}")), content).unwrap();
}

/// Creak frames every 20ms; `creaky` decides the flag per frame index.
pub fn creak_frames(frames: usize, creaky: impl Fn(usize) -> bool) -> String {
    let mut out = String::new();
    for frame in 0..frames {
        let t1 = frame as f64 * 0.02;
        let _ = writeln!(out, "{t1:.2} 0.5 {}", u8::from(creaky(frame)));
    }
    out
}

/// Formant frames every 10ms with times in milliseconds (as the upstream
/// tracker writes them); f0 is 100 + frame index so lookups are checkable.
pub fn fb_frames(frames: usize) -> String {
    let mut out = String::new();
    for frame in 0..frames {
        let t1_ms = frame * 10;
        let f0 = 100 + frame;
        let _ = writeln!(
            out,
            "{t1_ms} 0.5 {f1} {f2} {f3} {f4} {f0}",
            f1 = 500 + frame,
            f2 = 1500 + frame,
            f3 = 2500 + frame,
            f4 = 3500 + frame,
        );
    }
    out
}

/// A one-second "Go Bears"-like recording: two qualifying stressed vowels
/// placed so every interior sample lands mid-frame, plus silence, consonants,
/// an unstressed vowel, and a short pause.
pub fn go_bears_tiers() -> Vec<Tier<'static>> {
    vec![
        (
            "phone",
            vec![
                (0.0, 0.1, "sil"),
                (0.1, 0.225, "G"),
                (0.225, 0.465, "OW1"),
                (0.465, 0.585, "B"),
                (0.585, 0.825, "EH1"),
                (0.825, 0.9, "AH0"),
                (0.9, 1.0, "sp"),
            ],
        ),
        (
            "word",
            vec![(0.0, 0.1, ""), (0.1, 0.465, "GO"), (0.465, 0.9, "BEARS"), (0.9, 1.0, "")],
        ),
    ]
}

/// A recording whose only qualifying vowel is an AE1 inside "HAND".
pub fn hand_tiers() -> Vec<Tier<'static>> {
    vec![
        (
            "phone",
            vec![
                (0.0, 0.05, "sil"),
                (0.05, 0.105, "HH"),
                (0.105, 0.345, "AE1"),
                (0.345, 0.5, "N"),
                (0.5, 1.0, "sil"),
            ],
        ),
        ("word", vec![(0.0, 0.05, ""), (0.05, 0.5, "HAND"), (0.5, 1.0, "")]),
    ]
}
