use crate::loader::InputRow;
use once_cell::sync::Lazy;
use regex::Regex;

static TID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{8}$").expect("valid tid pattern"));
static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,7}[0-9]$").expect("valid login pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(InputRow),
    InvalidCardFormat(InputRow),
    InvalidLoginFormat(InputRow),
}

impl ValidationOutcome {
    pub fn row(&self) -> &InputRow {
        match self {
            ValidationOutcome::Valid(row)
            | ValidationOutcome::InvalidCardFormat(row)
            | ValidationOutcome::InvalidLoginFormat(row) => row,
        }
    }
}

/// Eight hex digits, nothing else.
pub fn is_valid_tid(tid: &str) -> bool {
    TID_PATTERN.is_match(tid)
}

/// Three to seven ASCII letters followed by a single digit.
pub fn is_valid_login(login: &str) -> bool {
    LOGIN_PATTERN.is_match(login)
}

/// Classifies a row. The card id is checked first, so a row failing both
/// rules is reported as [`ValidationOutcome::InvalidCardFormat`].
pub fn validate(row: InputRow) -> ValidationOutcome {
    if !is_valid_tid(&row.tid) {
        ValidationOutcome::InvalidCardFormat(row)
    } else if !is_valid_login(&row.login) {
        ValidationOutcome::InvalidLoginFormat(row)
    } else {
        ValidationOutcome::Valid(row)
    }
}
