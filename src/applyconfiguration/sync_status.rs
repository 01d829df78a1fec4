// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::JobState;
use serde::{Deserialize, Serialize};

/// Declarative configuration of the [`SyncStatus`](crate::types::SyncStatus) type for use
/// with apply. Timestamps are Unix epoch milliseconds.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusApplyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(rename = "job", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl SyncStatusApplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, value: JobState) -> Self {
        self.state = Some(value);
        self
    }

    pub fn with_job_id(mut self, value: impl Into<String>) -> Self {
        self.job_id = Some(value.into());
        self
    }

    pub fn with_started(mut self, value: i64) -> Self {
        self.started = Some(value);
        self
    }

    pub fn with_finished(mut self, value: i64) -> Self {
        self.finished = Some(value);
        self
    }

    pub fn with_scheduled(mut self, value: i64) -> Self {
        self.scheduled = Some(value);
        self
    }

    /// Appends to the message list. Values from repeated calls accumulate in call order.
    pub fn with_message<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_hash(mut self, value: impl Into<String>) -> Self {
        self.hash = Some(value.into());
        self
    }
}
