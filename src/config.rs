use crate::loader::ColumnOrder;
use crate::report::ReportDetail;
use crate::session::{AuthMode, ClientSecret};
use crate::DEFAULT_IDENTITY_TYPE;
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LOG_FILE: &str = "results.log";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportArg {
    /// Failed rows on stderr only
    Basic,
    /// Results table in --log-file and a summary on stdout
    Full,
}

impl From<ReportArg> for ReportDetail {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Basic => ReportDetail::BasicErrorsOnly,
            ReportArg::Full => ReportDetail::FullResultsLog,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "card-enroller",
    version,
    about = "Assign card-number identities to tenant users from a CSV file"
)]
#[command(group(
    ArgGroup::new("auth")
        .required(true)
        .args(["interactive", "client_id"])
))]
pub struct Cli {
    #[arg(long, help = "CSV file with login,tid columns")]
    pub path: PathBuf,
    #[arg(long = "ufo-url", help = "Tenant endpoint to authenticate against")]
    pub ufo_url: String,
    #[arg(long, help = "Email domain appended to each login")]
    pub domain: String,
    #[arg(long, help = "Sign in through the browser")]
    pub interactive: bool,
    #[arg(long, requires = "client_secret")]
    pub client_id: Option<String>,
    #[arg(
        long,
        env = "UFO_CLIENT_SECRET",
        hide_env_values = true,
        conflicts_with = "interactive"
    )]
    pub client_secret: Option<String>,
    #[arg(long, default_value = DEFAULT_IDENTITY_TYPE)]
    pub identity_type: String,
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
    #[arg(long, value_enum, default_value_t = ReportArg::Full)]
    pub report: ReportArg,
    #[arg(long, default_value_t = false, help = "Require the header to be exactly login,tid")]
    pub strict_columns: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--{0} must not be blank")]
    Blank(&'static str),
    #[error(
        "choose either --interactive or --client-id/--client-secret \
         (UFO_CLIENT_SECRET must be unset for interactive login)"
    )]
    AuthMode,
}

/// Everything a run needs, checked once at startup.
#[derive(Debug)]
pub struct RunConfig {
    pub path: PathBuf,
    pub tenant_url: String,
    pub domain: String,
    pub auth: AuthMode,
    pub identity_type: String,
    pub log_file: PathBuf,
    pub detail: ReportDetail,
    pub column_order: ColumnOrder,
}

impl Cli {
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let non_blank = |value: String, name| {
            if value.trim().is_empty() {
                Err(ConfigError::Blank(name))
            } else {
                Ok(value)
            }
        };

        let auth = match (self.interactive, self.client_id, self.client_secret) {
            (true, None, None) => AuthMode::Interactive,
            (false, Some(client_id), Some(client_secret)) => AuthMode::ClientCredentials {
                client_id: non_blank(client_id, "client-id")?,
                client_secret: ClientSecret::new(client_secret),
            },
            _ => return Err(ConfigError::AuthMode),
        };

        Ok(RunConfig {
            path: self.path,
            tenant_url: non_blank(self.ufo_url, "ufo-url")?,
            domain: non_blank(self.domain, "domain")?,
            auth,
            identity_type: non_blank(self.identity_type, "identity-type")?,
            log_file: self.log_file,
            detail: self.report.into(),
            column_order: if self.strict_columns {
                ColumnOrder::Strict
            } else {
                ColumnOrder::Unordered
            },
        })
    }
}
