//! Bulk assignment of card-number identities to tenant accounts.
//!
//! Rows are loaded from CSV ([`loader`]), checked ([`validate`]) and submitted
//! one at a time through an [`IdentityAssigner`] ([`Enroller`]). A failing row
//! is recorded and the batch moves on; [`report`] renders the outcome.

pub mod config;
pub mod loader;
pub mod remote;
pub mod report;
pub mod session;
pub mod ufo;
pub mod validate;

use log::info;

pub use crate::loader::{ColumnOrder, InputRow, LoadError};
pub use crate::remote::{IdentityAssigner, RemoteError};
pub use crate::report::{BatchSummary, IdentitySubmissionResult, ReportDetail, SubmissionStatus};
pub use crate::session::{AuthError, AuthMode, AuthProvider, ClientSecret, Session};
pub use crate::validate::{validate, ValidationOutcome};

pub const DEFAULT_IDENTITY_TYPE: &str = "CardNumber";

/// Submits validated rows through an [`IdentityAssigner`].
pub struct Enroller<'a> {
    assigner: &'a dyn IdentityAssigner,
    domain: String,
    identity_type: String,
}

impl<'a> Enroller<'a> {
    pub fn new(assigner: &'a dyn IdentityAssigner, domain: &str, identity_type: &str) -> Self {
        Enroller {
            assigner,
            domain: domain.to_owned(),
            identity_type: identity_type.to_owned(),
        }
    }

    pub fn email_for(&self, login: &str) -> String {
        format!("{}@{}", login, self.domain)
    }

    /// Processes every row in order and returns one result per row.
    pub fn process(&self, session: &Session, rows: Vec<InputRow>) -> Vec<IdentitySubmissionResult> {
        let total = rows.len();
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| self.process_row(session, row, index + 1, total))
            .collect()
    }

    fn process_row(
        &self,
        session: &Session,
        row: InputRow,
        position: usize,
        total: usize,
    ) -> IdentitySubmissionResult {
        let (row, status) = match validate(row) {
            ValidationOutcome::InvalidCardFormat(row) => (row, SubmissionStatus::CardFormatError),
            ValidationOutcome::InvalidLoginFormat(row) => (row, SubmissionStatus::LoginFormatError),
            ValidationOutcome::Valid(row) => {
                let email = self.email_for(&row.login);
                info!(
                    "[{}/{}] assigning {} to {}",
                    position, total, self.identity_type, email
                );
                let status = match self.assigner.assign_identity(
                    session,
                    &email,
                    &self.identity_type,
                    &row.tid,
                ) {
                    Ok(()) => SubmissionStatus::Success,
                    Err(err) => SubmissionStatus::RemoteError(err.message().to_owned()),
                };
                (row, status)
            }
        };
        IdentitySubmissionResult {
            login: row.login,
            tid: row.tid,
            status,
        }
    }
}

/// Validates and submits `rows` with `assigner`, one call per valid row.
pub fn process(
    session: &Session,
    assigner: &dyn IdentityAssigner,
    rows: Vec<InputRow>,
    domain: &str,
    identity_type: &str,
) -> Vec<IdentitySubmissionResult> {
    Enroller::new(assigner, domain, identity_type).process(session, rows)
}

#[cfg(test)]
use crate::remote::MockIdentityAssigner;
#[cfg(test)]
use mockall::predicate::{always, eq};

#[cfg(test)]
fn test_session() -> Session {
    Session::new(url::Url::parse("https://acme.example.com").unwrap(), "tok")
}

#[test]
fn sanity() {
    let mut assigner = MockIdentityAssigner::new();
    assigner
        .expect_assign_identity()
        .with(always(), eq("abc1@example.com"), eq("CardNumber"), eq("1a2b3c4d"))
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let results = process(
        &test_session(),
        &assigner,
        vec![InputRow::new("abc1", "1a2b3c4d", 1)],
        "example.com",
        DEFAULT_IDENTITY_TYPE,
    );

    assert_eq!(
        results,
        vec![IdentitySubmissionResult {
            login: "abc1".to_owned(),
            tid: "1a2b3c4d".to_owned(),
            status: SubmissionStatus::Success,
        }]
    );
}

#[test]
fn invalid_rows_are_never_submitted() {
    let mut assigner = MockIdentityAssigner::new();
    assigner.expect_assign_identity().times(0);

    let rows = vec![
        InputRow::new("abc1", "1a2b3c4", 1),
        InputRow::new("ab1", "1a2b3c4d", 2),
        InputRow::new("x", "nothex!!", 3),
    ];
    let results = process(&test_session(), &assigner, rows, "example.com", "CardNumber");

    let statuses: Vec<_> = results.into_iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            SubmissionStatus::CardFormatError,
            SubmissionStatus::LoginFormatError,
            SubmissionStatus::CardFormatError,
        ]
    );
}

#[test]
fn remote_failure_does_not_stop_the_batch() {
    let mut assigner = MockIdentityAssigner::new();
    assigner
        .expect_assign_identity()
        .withf(|_, email, _, _| email.starts_with("bad1@"))
        .times(1)
        .returning(|_, _, _, _| Err(RemoteError::new("HTTP 404: user not found")));
    assigner
        .expect_assign_identity()
        .withf(|_, email, _, _| !email.starts_with("bad1@"))
        .times(2)
        .returning(|_, _, _, _| Ok(()));

    let rows = vec![
        InputRow::new("abc1", "1a2b3c4d", 1),
        InputRow::new("bad1", "1a2b3c4d", 2),
        InputRow::new("xyz2", "DEADBEEF", 3),
    ];
    let results = process(&test_session(), &assigner, rows, "example.com", "CardNumber");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, SubmissionStatus::Success);
    assert_eq!(
        results[1].status,
        SubmissionStatus::RemoteError("HTTP 404: user not found".to_owned())
    );
    assert_eq!(results[2].status, SubmissionStatus::Success);

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.successes + summary.failures, summary.total);
}

#[test]
fn no_rows_means_no_calls() {
    let mut assigner = MockIdentityAssigner::new();
    assigner.expect_assign_identity().times(0);

    let results = process(&test_session(), &assigner, Vec::new(), "example.com", "CardNumber");
    assert!(results.is_empty());
    assert_eq!(BatchSummary::from_results(&results), BatchSummary::default());
}

#[test]
fn duplicates_are_submitted_every_time() {
    let mut assigner = MockIdentityAssigner::new();
    assigner
        .expect_assign_identity()
        .times(2)
        .returning(|_, _, _, _| Ok(()));

    let rows = vec![
        InputRow::new("abc1", "1a2b3c4d", 1),
        InputRow::new("abc1", "1a2b3c4d", 2),
    ];
    let results = process(&test_session(), &assigner, rows, "example.com", "CardNumber");
    assert_eq!(results.len(), 2);
}

#[test]
fn login_case_is_preserved_in_email() {
    let mut assigner = MockIdentityAssigner::new();
    assigner
        .expect_assign_identity()
        .with(always(), eq("JDoe1@Example.COM"), eq("Badge"), eq("DeadBeef"))
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    process(
        &test_session(),
        &assigner,
        vec![InputRow::new("JDoe1", "DeadBeef", 1)],
        "Example.COM",
        "Badge",
    );
}
