//! Record shapes shared by the store, the views and the report.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{self, Write};
use std::str::FromStr;
use uuid::Uuid;

/// Display text for a reference that cannot be found in the loaded collection.
pub const UNRESOLVED: &str = "N/A";

/// Opaque identifier assigned by the store when a record is first saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for RecordId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field `{field}` is required")]
pub struct ValidationError {
    pub field: &'static str,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError { field });
    }
    Ok(())
}

/// A record type kept in its own collection.
pub trait Document: Clone + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static {
    const COLLECTION: &'static str;

    /// Required-field check only; formats are left to the form inputs.
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analyst {
    pub name: String,
    pub email: String,
    pub team: String,
}

impl Document for Analyst {
    const COLLECTION: &'static str = "analysts";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("team", &self.team)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Support {
    pub name: String,
    pub analyst_id: RecordId,
}

impl Document for Support {
    const COLLECTION: &'static str = "supports";

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("analystId", self.analyst_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub description: String,
}

impl Document for Reason {
    const COLLECTION: &'static str = "reasons";

    fn validate(&self) -> Result<(), ValidationError> {
        require("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub support_id: RecordId,
    pub reason_id: RecordId,
    pub analyst_id: RecordId,
    pub observation: String,
    pub date: NaiveDate,
}

impl Ticket {
    /// Empty ticket owned by `analyst_id`, dated `date`.
    pub fn blank(analyst_id: RecordId, date: NaiveDate) -> Self {
        Self {
            support_id: RecordId::default(),
            reason_id: RecordId::default(),
            analyst_id,
            observation: String::new(),
            date,
        }
    }
}

impl Document for Ticket {
    const COLLECTION: &'static str = "tickets";

    fn validate(&self) -> Result<(), ValidationError> {
        require("supportId", self.support_id.as_str())?;
        require("reasonId", self.reason_id.as_str())?;
        require("observation", &self.observation)
    }
}

/// A saved record: the store-assigned id next to its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Stored<T> {
    pub fn new(id: RecordId, fields: T) -> Self {
        Self { id, fields }
    }
}

/// Form buffer contents: a record that was never saved, or a copy of a saved one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    Draft(T),
    Persisted(Stored<T>),
}

impl<T> Entry<T> {
    pub fn fields(&self) -> &T {
        match self {
            Self::Draft(fields) => fields,
            Self::Persisted(stored) => &stored.fields,
        }
    }

    pub fn fields_mut(&mut self) -> &mut T {
        match self {
            Self::Draft(fields) => fields,
            Self::Persisted(stored) => &mut stored.fields,
        }
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        match self {
            Self::Draft(_) => None,
            Self::Persisted(stored) => Some(&stored.id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

pub fn lookup<'a, T>(items: &'a [Stored<T>], id: &RecordId) -> Option<&'a Stored<T>> {
    items.iter().find(|item| &item.id == id)
}

/// Resolves `id` against `items` and projects a display field, or `N/A`.
pub fn resolve<'a, T>(
    items: &'a [Stored<T>],
    id: &RecordId,
    project: impl Fn(&'a T) -> &'a str,
) -> &'a str {
    lookup(items, id)
        .map(|item| project(&item.fields))
        .unwrap_or(UNRESOLVED)
}

/// Formats with a strftime pattern, falling back to ISO when the pattern is invalid.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn test_analyst_requires_every_field() {
        let analyst = Analyst {
            name: "Maria Silva".into(),
            email: "maria@x.com".into(),
            team: " ".into(),
        };
        assert_eq!(analyst.validate(), Err(ValidationError { field: "team" }));

        let analyst = Analyst {
            team: "N2".into(),
            ..analyst
        };
        assert!(analyst.validate().is_ok());
    }

    #[test]
    fn test_ticket_requires_references_and_observation() {
        let ticket = Ticket::blank(RecordId::new("a1"), date("2024-01-10"));
        assert_eq!(ticket.validate(), Err(ValidationError { field: "supportId" }));

        let ticket = Ticket {
            support_id: "s1".into(),
            reason_id: "r1".into(),
            observation: "teste".into(),
            ..ticket
        };
        assert!(ticket.validate().is_ok());
    }

    #[test]
    fn test_entry_editing_id() {
        let draft = Entry::Draft(Reason::default());
        assert!(draft.editing_id().is_none());
        assert!(!draft.is_editing());

        let persisted = Entry::Persisted(Stored::new(
            RecordId::new("r1"),
            Reason {
                description: "Senha".into(),
            },
        ));
        assert_eq!(persisted.editing_id(), Some(&RecordId::new("r1")));
        assert_eq!(persisted.fields().description, "Senha");
    }

    #[test]
    fn test_resolve_unknown_id_is_unresolved() {
        let analysts = vec![Stored::new(
            RecordId::new("a1"),
            Analyst {
                name: "Maria Silva".into(),
                email: "maria@x.com".into(),
                team: "N2".into(),
            },
        )];

        assert_eq!(resolve(&analysts, &"a1".into(), |a| a.name.as_str()), "Maria Silva");
        assert_eq!(resolve(&analysts, &"gone".into(), |a| a.name.as_str()), UNRESOLVED);
    }

    #[test]
    fn test_stored_serializes_flat_camel_case() {
        let stored = Stored::new(
            RecordId::new("t1"),
            Ticket {
                support_id: "s1".into(),
                reason_id: "r1".into(),
                analyst_id: "a1".into(),
                observation: "teste".into(),
                date: date("2024-01-10"),
            },
        );

        let json = serde_json::to_value(&stored).expect("serialize");
        assert_eq!(json["id"], "t1");
        assert_eq!(json["supportId"], "s1");
        assert_eq!(json["date"], "2024-01-10");

        let back: Stored<Ticket> = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, stored);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date("2024-01-10"), "%d/%m/%Y"), "10/01/2024");
    }
}
