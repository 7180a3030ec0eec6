//! Wire and storage types for the todo API.
//!
//! # Design
//! Timestamps travel as unix seconds, matching the INTEGER columns in the
//! `todos` table. Request payloads are plain serde structs; `validate`
//! trims and checks them before they reach the store, so the store never
//! sees blank text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Importance of a todo. Stored as lowercase TEXT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown priority `{0}`")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A single todo row as returned by every endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
    pub sort_order: i64,
}

/// Body of `POST /todos`.
///
/// `text` defaults to empty so a missing field is reported as a validation
/// error rather than a decoding error.
#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateTodo {
    pub fn validate(self) -> Result<Self, AppError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::Validation("text is required".to_string()));
        }
        Ok(Self {
            text,
            category: normalize_category(self.category),
            ..self
        })
    }
}

/// Body of `PATCH /todos/{id}`.
///
/// The outer `Option` says whether a field was sent at all; for nullable
/// columns the inner `Option` carries an explicit `null` that clears it.
#[derive(Debug, Default, Deserialize)]
pub struct PatchTodo {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
}

impl PatchTodo {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.due_date.is_none() && self.priority.is_none() && self.category.is_none()
    }

    pub fn validate(self) -> Result<Self, AppError> {
        let text = match self.text {
            Some(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(AppError::Validation("text must not be empty".to_string()));
                }
                Some(text.to_string())
            }
            None => None,
        };
        Ok(Self {
            text,
            category: self.category.map(normalize_category),
            ..self
        })
    }
}

/// Body of `PUT /todos/reorder`: ids in their new display order.
#[derive(Debug, Deserialize)]
pub struct ReorderTodos {
    pub ids: Vec<i64>,
}

impl ReorderTodos {
    pub fn validate(self) -> Result<Self, AppError> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        if let Some(dup) = self.ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::Validation(format!("id {dup} appears more than once")));
        }
        Ok(self)
    }
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_timestamp<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    chrono::serde::ts_seconds_option::deserialize(deserializer).map(Some)
}
