// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// API group served by the provisioning apiserver
pub const GROUP: &str = "provisioning.grafana.app";

/// API version of the Repository resource
pub const VERSION: &str = "v0alpha1";

/// Default field manager used for server-side apply
pub const FIELD_MANAGER: &str = "provisioning-client";

/// Environment variables read by [`crate::config::Config`]
pub mod env {
    pub const NAMESPACE: &str = "PROVISIONING_NAMESPACE";
    pub const FIELD_MANAGER: &str = "PROVISIONING_FIELD_MANAGER";
    pub const REQUEST_TIMEOUT_SECS: &str = "PROVISIONING_REQUEST_TIMEOUT_SECS";
}

/// Defaults applied when the environment leaves a setting unset
pub mod defaults {
    pub const NAMESPACE: &str = "default";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
