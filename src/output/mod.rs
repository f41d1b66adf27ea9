use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    domain::{JobId, QueueId, Reading},
    error::RepositoryError,
    storage::ReadingRepository,
};


const READING_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Summary of one dispatch run. Produced once, never persisted.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub total_records: usize,
    pub batch_size: usize,
    pub jobs_dispatched: usize,
    /// Jobs dispatched per target queue
    pub per_queue: BTreeMap<QueueId, usize>,
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total_records: {}, batch_size: {}, jobs_dispatched: {}",
            self.total_records, self.batch_size, self.jobs_dispatched
        )?;
        for (queue, jobs) in &self.per_queue {
            write!(f, ", {queue}: {jobs}")?;
        }
        Ok(())
    }
}

/// What a worker reports once it is done with a job.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingResult {
    #[serde(serialize_with = "serialize_job_id")]
    pub job: JobId,
    pub queue: QueueId,
    pub attempted: usize,
    pub succeeded: usize,
}

impl ProcessingResult {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

fn serialize_job_id<S: serde::Serializer>(id: &JobId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::from(*id))
}

/// Outcome of a complete run: the dispatch report and the result of every processed job, ordered by job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub report: DispatchReport,
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.results.iter().map(|r| r.attempted).sum()
    }

    pub fn persisted(&self) -> usize {
        self.results.iter().map(|r| r.succeeded).sum()
    }
}

/// Public DTO representing a persisted reading.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadingRecord {
    pub reading_date: String,
    pub temperature: Decimal,
}

impl ReadingRecord {
    pub(crate) fn from_domain(reading: &Reading) -> Self {
        Self {
            reading_date: reading
                .reading_date()
                .format(READING_DATE_FORMAT)
                .to_string(),
            temperature: reading.temperature(),
        }
    }
}

/// Repository writing every created reading as a CSV row to the wrapped writer.
pub struct CsvReadingWriter<W: Write> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write> CsvReadingWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(writer)),
        }
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }

    /// Flushes and returns the wrapped writer.
    pub fn into_inner(self) -> Result<W, RepositoryError> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| RepositoryError::Unavailable(e.error().to_string()))
    }
}

impl<W: Write + Send> ReadingRepository for CsvReadingWriter<W> {
    fn create(&self, reading: Reading) -> Result<(), RepositoryError> {
        self.writer
            .lock()
            .serialize(ReadingRecord::from_domain(&reading))
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}
