// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label and field selector matching for list, watch and delete-collection.

use super::status::StatusError;
use serde_json::Value;

/// Field paths the fake server can filter on
const SUPPORTED_FIELDS: &[&str] = &["metadata.name", "metadata.namespace"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
}

impl Requirement {
    fn parse(term: &str) -> Result<Self, StatusError> {
        let term = term.trim();
        if term.contains('(') {
            return Err(StatusError::bad_request(format!(
                "unsupported selector requirement: {}",
                term
            )));
        }

        let requirement = if let Some(key) = term.strip_prefix('!') {
            Requirement::NotExists(key.trim().to_string())
        } else if let Some((key, value)) = term.split_once("!=") {
            Requirement::NotEquals(key.trim().to_string(), value.trim().to_string())
        } else if let Some((key, value)) = term.split_once("==") {
            Requirement::Equals(key.trim().to_string(), value.trim().to_string())
        } else if let Some((key, value)) = term.split_once('=') {
            Requirement::Equals(key.trim().to_string(), value.trim().to_string())
        } else {
            Requirement::Exists(term.to_string())
        };

        if requirement.key().is_empty() {
            return Err(StatusError::bad_request(format!(
                "invalid selector requirement: {}",
                term
            )));
        }
        Ok(requirement)
    }

    fn key(&self) -> &str {
        match self {
            Requirement::Equals(key, _)
            | Requirement::NotEquals(key, _)
            | Requirement::Exists(key)
            | Requirement::NotExists(key) => key,
        }
    }

    fn matches(&self, actual: Option<&str>) -> bool {
        match self {
            Requirement::Equals(_, expected) => actual == Some(expected.as_str()),
            Requirement::NotEquals(_, expected) => actual != Some(expected.as_str()),
            Requirement::Exists(_) => actual.is_some(),
            Requirement::NotExists(_) => actual.is_none(),
        }
    }
}

fn parse_terms(selector: Option<&str>) -> Result<Vec<Requirement>, StatusError> {
    selector
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').map(Requirement::parse).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

/// Parsed `labelSelector` and `fieldSelector` query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    labels: Vec<Requirement>,
    fields: Vec<Requirement>,
}

impl ListFilter {
    pub fn parse(label_selector: Option<&str>, field_selector: Option<&str>) -> Result<Self, StatusError> {
        let labels = parse_terms(label_selector)?;
        let fields = parse_terms(field_selector)?;

        if let Some(unsupported) = fields
            .iter()
            .find(|r| !SUPPORTED_FIELDS.contains(&r.key()))
        {
            return Err(StatusError::bad_request(format!(
                "field label not supported: {}",
                unsupported.key()
            )));
        }

        Ok(Self { labels, fields })
    }

    pub fn matches(&self, object: &Value) -> bool {
        let labels = object.pointer("/metadata/labels");
        let label_match = self.labels.iter().all(|r| {
            r.matches(labels.and_then(|l| l.get(r.key())).and_then(Value::as_str))
        });

        label_match
            && self.fields.iter().all(|r| {
                let pointer = format!("/{}", r.key().replace('.', "/"));
                r.matches(object.pointer(&pointer).and_then(Value::as_str))
            })
    }
}
