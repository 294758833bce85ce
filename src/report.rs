use csv::WriterBuilder;
use log::{error, warn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    CardFormatError,
    LoginFormatError,
    RemoteError(String),
}

impl SubmissionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionStatus::Success)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Success => f.write_str("Success"),
            SubmissionStatus::CardFormatError => f.write_str("CardFormatError"),
            SubmissionStatus::LoginFormatError => f.write_str("LoginFormatError"),
            SubmissionStatus::RemoteError(message) => write!(f, "RemoteError: {}", message),
        }
    }
}

/// Outcome of one input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySubmissionResult {
    pub login: String,
    pub tid: String,
    pub status: SubmissionStatus,
}

impl Serialize for IdentitySubmissionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("IdentitySubmissionResult", 3)?;
        state.serialize_field("login", &self.login)?;
        state.serialize_field("tid", &self.tid)?;
        state.serialize_field("status", &self.status.to_string())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[IdentitySubmissionResult]) -> Self {
        let successes = results.iter().filter(|r| r.status.is_success()).count();
        BatchSummary {
            total: results.len(),
            successes,
            failures: results.len() - successes,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, Successes: {}, Failures: {}",
            self.total, self.successes, self.failures
        )
    }
}

/// How much of a finished run gets reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportDetail {
    /// Failed rows on standard error, nothing else.
    BasicErrorsOnly,
    /// Results table to a file plus a summary on standard output.
    #[default]
    FullResultsLog,
}

/// Writes the `login,tid,status` table, one line per result.
pub fn write_results<T: io::Write>(
    results: &[IdentitySubmissionResult],
    target: T,
) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(target);
    // serialize() only emits a header with the first record
    if results.is_empty() {
        writer.write_record(["login", "tid", "status"])?;
    }
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Emits the report for `results` at the requested detail. `results_log` and
/// `summary_out` are only written for [`ReportDetail::FullResultsLog`].
pub fn report<L: io::Write, S: io::Write>(
    results: &[IdentitySubmissionResult],
    detail: ReportDetail,
    results_log: L,
    mut summary_out: S,
) -> Result<BatchSummary, csv::Error> {
    let summary = BatchSummary::from_results(results);
    let failed = results.iter().filter(|r| !r.status.is_success());
    match detail {
        ReportDetail::BasicErrorsOnly => {
            failed.for_each(|r| error!("{} ({}): {}", r.login, r.tid, r.status));
        }
        ReportDetail::FullResultsLog => {
            failed.for_each(|r| warn!("{} ({}): {}", r.login, r.tid, r.status));
            write_results(results, results_log)?;
            writeln!(summary_out, "{}", summary)?;
        }
    }
    Ok(summary)
}
