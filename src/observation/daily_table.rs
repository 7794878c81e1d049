use super::{ExposureLog, ExposureRecord, LogError, Rank};
use crate::sequencer::SweepResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Per-sample current trace stored next to an exposure row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrace {
    pub timestamp_utc: DateTime<Utc>,
    pub rank: Rank,
    pub samples: Vec<f64>,
}

#[cfg(test)]
impl RawTrace {
    pub fn read_from(path: &Path) -> Result<Self, LogError> {
        let mut file = File::open(path)?;
        Ok(bincode::serde::decode_from_std_read(&mut file, bincode::config::standard())?)
    }
}

struct OpenDay {
    date: NaiveDate,
    writer: csv::Writer<File>,
}

impl OpenDay {
    /// Opens the table for appending; the header row is only written into an empty file.
    fn open(path: &Path, date: NaiveDate) -> Result<Self, LogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fresh = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new().has_headers(fresh).from_writer(file);
        Ok(Self { date, writer })
    }
}

/// Flat-file [`ExposureLog`]: one CSV table per UTC day under `root`,
/// with raw traces and mount telemetry beside it.
///
/// ```text
/// root/20261018.csv               exposure rows
/// root/20261018_traces/*.bin      one raw trace per row
/// root/20261018_mount.jsonl       one line per elevation sweep
/// ```
pub struct DailyTable {
    root: PathBuf,
    open_day: Option<OpenDay>,
}

impl DailyTable {
    const DAY_FORMAT: &'static str = "%Y%m%d";

    pub fn open<T: AsRef<Path>>(root: T) -> Result<Self, LogError> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self { root: root.as_ref().to_path_buf(), open_day: None })
    }

    pub fn root(&self) -> &Path { &self.root }

    fn day_stem(date: NaiveDate) -> String { date.format(Self::DAY_FORMAT).to_string() }

    pub fn table_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.csv", Self::day_stem(date)))
    }

    pub fn trace_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}_traces", Self::day_stem(date)))
    }

    pub fn telemetry_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}_mount.jsonl", Self::day_stem(date)))
    }

    pub fn trace_path(&self, record: &ExposureRecord) -> PathBuf {
        let rank = record.rank();
        self.trace_dir(record.timestamp_utc().date_naive()).join(format!(
            "{}_az{:02}_alt{:02}.bin",
            record.timestamp_utc().format("%H%M%S%6f"),
            rank.azimuth,
            rank.altitude
        ))
    }

    /// Returns the writer of `date`, rolling over to a new table at the UTC date change.
    fn writer_for(&mut self, date: NaiveDate) -> Result<&mut csv::Writer<File>, LogError> {
        if let Some(mut previous) = self.open_day.take_if(|day| day.date != date) {
            previous.writer.flush()?;
        }
        let day = match self.open_day.take() {
            Some(day) => day,
            None => OpenDay::open(&self.table_path(date), date)?,
        };
        Ok(&mut self.open_day.insert(day).writer)
    }

    /// Reads back every exposure row of `date`. A day without a table has no rows.
    pub fn read_records(&self, date: NaiveDate) -> Result<Vec<ExposureRecord>, LogError> {
        let path = self.table_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader.deserialize().collect::<Result<Vec<ExposureRecord>, _>>()?;
        Ok(records)
    }
}

impl ExposureLog for DailyTable {
    fn append_record(&mut self, record: &ExposureRecord) -> Result<(), LogError> {
        self.writer_for(record.timestamp_utc().date_naive())?.serialize(record)?;
        Ok(())
    }

    fn append_raw_trace(&mut self, record: &ExposureRecord, samples: &[f64]) -> Result<(), LogError> {
        fs::create_dir_all(self.trace_dir(record.timestamp_utc().date_naive()))?;
        let trace = RawTrace {
            timestamp_utc: record.timestamp_utc(),
            rank: record.rank(),
            samples: samples.to_vec(),
        };
        let mut out = BufWriter::new(File::create(self.trace_path(record))?);
        bincode::serde::encode_into_std_write(&trace, &mut out, bincode::config::standard())?;
        out.flush()?;
        Ok(())
    }

    fn append_telemetry(&mut self, sweep: &SweepResult) -> Result<(), LogError> {
        let path = self.telemetry_path(sweep.finished_at().date_naive());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut line = serde_json::to_vec(sweep)?;
        line.push(b'\n');
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        if let Some(day) = self.open_day.as_mut() {
            day.writer.flush()?;
            day.writer.get_ref().sync_data()?;
        }
        Ok(())
    }
}
