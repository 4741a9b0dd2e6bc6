//! Record payloads for the change request API.
//!
//! # Design
//! Known fields are typed `Option`s: `None` means "not supplied" and is never
//! serialized, so defaults fill exactly the fields a caller left out. Fields
//! the client has no name for travel in `extra` and are sent verbatim.
//!
//! A known key can also arrive through `extra`. Merging moves it into its
//! typed field when the value has the right shape and keeps it raw otherwise,
//! so a merged payload never carries the same key twice. Within one layer the
//! typed field wins over an `extra` entry of the same name.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::merge::{merge_objects, pick, Merge};

/// Move `extra[key]` into `field`. A value that does not deserialize stays in
/// `extra` unless `field` is already set.
fn lift<T: DeserializeOwned>(field: &mut Option<T>, extra: &mut Map<String, Value>, key: &str) {
    let Some(raw) = extra.remove(key) else {
        return;
    };
    if field.is_some() {
        return;
    }
    match serde_json::from_value(raw.clone()) {
        Ok(value) => *field = Some(value),
        Err(_) => {
            extra.insert(key.to_string(), raw);
        }
    }
}

/// Resolve one known key across two lifted layers. Whichever layer holds the
/// key last wins, whether it holds it typed or raw.
fn resolve<T: Clone>(
    base: &Option<T>,
    overrides: &Option<T>,
    overrides_extra: &Map<String, Value>,
    merged_extra: &mut Map<String, Value>,
    key: &str,
) -> Option<T> {
    if overrides.is_some() {
        merged_extra.remove(key);
        return overrides.clone();
    }
    if overrides_extra.contains_key(key) {
        return None;
    }
    pick(base, overrides)
}

/// Implement `Merge` for a payload struct from its typed fields and their
/// wire names.
macro_rules! record_merge {
    ($ty:ident { $($field:ident => $key:literal),* $(,)? }) => {
        impl $ty {
            fn lifted(&self) -> Self {
                let mut out = self.clone();
                $( lift(&mut out.$field, &mut out.extra, $key); )*
                out
            }
        }

        impl Merge for $ty {
            fn merge(&self, overrides: &Self) -> Self {
                let base = self.lifted();
                let overrides = overrides.lifted();
                let mut extra = merge_objects(&base.extra, &overrides.extra);
                $(
                    let $field = resolve(
                        &base.$field,
                        &overrides.$field,
                        &overrides.extra,
                        &mut extra,
                        $key,
                    );
                )*
                Self { $($field,)* extra }
            }
        }
    };
}

/// Payload for opening a change request (`POST /v2/releaselog`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenRecordInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_of_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_for_change_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_there_be_an_outage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_one: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// A service id string, or whatever shape the API accepts (e.g. a list).
    pub service_ids: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OpenRecordInput {
    pub fn defaults() -> Self {
        Self {
            reason_for_change_details: Some("Deployment".to_string()),
            change_category: Some("Minor".to_string()),
            risk_profile: Some("Low".to_string()),
            environment: Some("Test".to_string()),
            will_there_be_an_outage: Some("No".to_string()),
            notify: Some(false),
            ..Self::default()
        }
    }

    pub fn with_defaults(&self) -> Self {
        Self::defaults().merge(self)
    }
}

record_merge!(OpenRecordInput {
    owner_email_address => "ownerEmailAddress",
    summary_of_change => "summaryOfChange",
    change_description => "changeDescription",
    reason_for_change_details => "reasonForChangeDetails",
    change_category => "changeCategory",
    risk_profile => "riskProfile",
    environment => "environment",
    will_there_be_an_outage => "willThereBeAnOutage",
    resource_one => "resourceOne",
    service_ids => "serviceIds",
    notify_channel => "notifyChannel",
    notify => "notify",
});

/// Payload for closing a change request (`POST /v2/close`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloseRecordInput {
    /// Id of the record to close, as returned by the open call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_by_email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CloseRecordInput {
    pub fn defaults() -> Self {
        Self {
            close_category: Some("Implemented".to_string()),
            notify: Some(false),
            ..Self::default()
        }
    }

    pub fn with_defaults(&self) -> Self {
        Self::defaults().merge(self)
    }
}

record_merge!(CloseRecordInput {
    id => "id",
    closed_by_email_address => "closedByEmailAddress",
    close_category => "closeCategory",
    notify_channel => "notifyChannel",
    notify => "notify",
});

/// A record as returned inside `changeRequests`. Only `id` is relied on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of a successful open or close response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequestList {
    pub change_requests: Vec<ChangeRequest>,
}
