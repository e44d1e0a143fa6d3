//! Review verdicts and the status-change message built from them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PollError;
use crate::practicum::TrackedRecord;

/// Reviewer verdict on a homework. Closed set; anything else is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    pub fn text(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for Verdict {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(PollError::UnknownVerdict(other.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the status message for the most recent record.
///
/// Returns `Ok(None)` for an empty window. The server lists the newest
/// homework first, so only `records[0]` is looked at.
pub fn parse_status(records: &[TrackedRecord]) -> Result<Option<String>, PollError> {
    let Some(record) = records.first() else {
        tracing::debug!("No homeworks in the requested window");
        return Ok(None);
    };

    // The live API sends `homework_name`; `name` is accepted as well.
    let name = record
        .str_field("homework_name")
        .or_else(|| record.str_field("name"))
        .ok_or_else(|| PollError::MissingField("homework_name".to_string()))?;

    let status = match record.field("status") {
        None => return Err(PollError::MissingField("status".to_string())),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(PollError::UnknownVerdict(other.to_string())),
    };

    let verdict: Verdict = status.parse()?;
    tracing::debug!(homework = name, verdict = %verdict, "Parsed homework status");
    Ok(Some(status_message(name, verdict)))
}

pub fn status_message(name: &str, verdict: Verdict) -> String {
    format!(
        "Изменился статус проверки работы \"{name}\". {}",
        verdict.text()
    )
}
