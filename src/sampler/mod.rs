//! SegmentSampler: resamples each located segment into evenly spaced
//! measurement points and accumulates the extracted values. Purely numeric;
//! no file-system interaction happens here.

use crate::table::{RowView, SampleTable};
use crate::types::{
    CreakProfile, PhoneClass, PhoneSample, PitchTrack, RecordingError, Segment,
};

/// The nsteps - 1 query times strictly inside `[start, start + duration]`,
/// spaced `duration / nsteps` apart. Both boundary timestamps are excluded
/// to avoid edge artifacts at segmentation cut points.
pub fn sample_times(start: f64, duration: f64, nsteps: usize) -> Vec<f64> {
    let inc = duration / nsteps as f64;
    (1..nsteps).map(|i| start + inc * i as f64).collect()
}

pub struct SegmentSampler<'t> {
    table: &'t SampleTable,
    nsteps: usize,
}

impl<'t> SegmentSampler<'t> {
    pub fn new(table: &'t SampleTable, nsteps: usize) -> Self {
        Self { table, nsteps }
    }

    fn row_at(&self, time: f64) -> Result<RowView<'t>, RecordingError> {
        self.table.row_at(time).ok_or_else(|| RecordingError::LookupMiss {
            time,
            path: self.table.path().to_path_buf(),
        })
    }

    fn integer_field(&self, row: &RowView<'t>, field: &str, time: f64) -> Result<i64, RecordingError> {
        row.integer(field).map_err(|_| RecordingError::BadFieldValue {
            field: field.to_string(),
            time,
        })
    }

    fn float_field(&self, row: &RowView<'t>, field: &str, time: f64) -> Result<f64, RecordingError> {
        row.float(field).map_err(|_| RecordingError::BadFieldValue {
            field: field.to_string(),
            time,
        })
    }

    /// Adds one creak flag per interior step to the recording-wide profile.
    /// The profile's slot counter runs across segments and is never reset.
    pub fn accumulate_creak(
        &self,
        segment: &Segment,
        profile: &mut CreakProfile,
    ) -> Result<(), RecordingError> {
        for time in sample_times(segment.start, segment.duration(), self.nsteps) {
            let row = self.row_at(time)?;
            let creak = self.integer_field(&row, "creak", time)?;
            let creak = u32::try_from(creak).map_err(|_| RecordingError::BadFieldValue {
                field: "creak".to_string(),
                time,
            })?;
            profile.push(creak);
        }
        Ok(())
    }

    /// Appends one f0 measurement (and its source frame time) per interior
    /// step to the recording's pitch track.
    pub fn extend_pitch(
        &self,
        segment: &Segment,
        track: &mut PitchTrack,
    ) -> Result<(), RecordingError> {
        for time in sample_times(segment.start, segment.duration(), self.nsteps) {
            let row = self.row_at(time)?;
            let f0 = self.float_field(&row, "f0", time)?;
            track.push(f0, row.t1());
        }
        Ok(())
    }

    /// Emits flattened timeline rows for one phone: a vowel takes one slot
    /// per interior sample, a consonant exactly one slot with null fields.
    pub fn extend_phone_rows(
        &self,
        segment: &Segment,
        rows: &mut Vec<PhoneSample>,
    ) -> Result<(), RecordingError> {
        match &segment.vowel {
            Some(vowel) => {
                for time in sample_times(segment.start, segment.duration(), self.nsteps) {
                    let row = self.row_at(time)?;
                    rows.push(PhoneSample {
                        phone: segment.label.clone(),
                        class: PhoneClass::Vowel,
                        vowel: Some(vowel.base.clone()),
                        slot: rows.len(),
                        time: Some(row.t1()),
                        f0: Some(self.float_field(&row, "f0", time)?),
                        f1: Some(self.float_field(&row, "f1", time)?),
                        f2: Some(self.float_field(&row, "f2", time)?),
                        f3: Some(self.float_field(&row, "f3", time)?),
                        f4: Some(self.float_field(&row, "f4", time)?),
                    });
                }
            }
            None => rows.push(PhoneSample {
                phone: segment.label.clone(),
                class: PhoneClass::Consonant,
                vowel: None,
                slot: rows.len(),
                time: None,
                f0: None,
                f1: None,
                f2: None,
                f3: None,
                f4: None,
            }),
        }
        Ok(())
    }
}
