//! Normalisation of webhook responses.
//!
//! Both webhooks return an array of rows whose interesting content is a JSON
//! document serialised into a string field. The body is validated once (a bad
//! envelope fails the whole batch), then every embedded document is parsed on
//! its own: a malformed row becomes an [`ItemOutcome::Skipped`] and is logged,
//! the rest of the batch goes through.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::records::{CountryInfo, Invoice, ProcessedInvoice, TravelListing, Voyage};

const JSON_FIELD: &str = "json";
const FILE_FIELD: &str = "file";
const INFO_FIELD: &str = "info_travel";

/// Result of normalising a single webhook row.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<T> {
    Parsed(T),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The row itself is not a JSON object.
    NotAnObject(&'static str),
    MissingJsonField,
    InvalidJson(String),
    /// The embedded document parsed, but not to an object.
    NotStructured(&'static str),
    UnexpectedFields(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject(kind) => write!(f, "row is {} instead of an object", kind),
            SkipReason::MissingJsonField => write!(f, "row has no string '{}' field", JSON_FIELD),
            SkipReason::InvalidJson(e) => write!(f, "embedded JSON does not parse: {}", e),
            SkipReason::NotStructured(kind) => write!(f, "embedded JSON is {} instead of an object", kind),
            SkipReason::UnexpectedFields(e) => write!(f, "embedded object has unexpected fields: {}", e),
        }
    }
}

/// Cleans a resource URL coming from the webhook.
///
/// Surrounding whitespace is trimmed and a single pair of wrapping backticks
/// is removed. An empty result is treated as no URL at all.
pub fn clean_resource_url(raw: &str) -> Option<String> {
    let mut url = raw.trim();
    if url.len() >= 2 && url.starts_with('`') && url.ends_with('`') {
        url = url[1..url.len() - 1].trim();
    }

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Re-indents an embedded JSON string for display, two spaces per level.
/// Input that does not parse is returned unchanged.
pub fn pretty_json(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Normalises one row of the invoice webhook.
pub fn parse_invoice_item(item: &Value) -> ItemOutcome<ProcessedInvoice> {
    let Some(row) = item.as_object() else {
        return ItemOutcome::Skipped(SkipReason::NotAnObject(json_kind(item)));
    };
    let Some(embedded) = row.get(JSON_FIELD).and_then(Value::as_str) else {
        return ItemOutcome::Skipped(SkipReason::MissingJsonField);
    };

    let parsed = match parse_embedded_object::<Invoice>(embedded) {
        ItemOutcome::Parsed(invoice) => invoice,
        ItemOutcome::Skipped(reason) => return ItemOutcome::Skipped(reason),
    };

    let file = row
        .get(FILE_FIELD)
        .and_then(Value::as_str)
        .and_then(clean_resource_url);

    ItemOutcome::Parsed(ProcessedInvoice {
        parsed,
        original_json: embedded.to_string(),
        file,
    })
}

/// Normalises the whole invoice webhook body.
///
/// Fails only when the body is not an array; malformed rows are dropped.
pub fn normalize_invoices(body: &Value) -> Result<Vec<ProcessedInvoice>> {
    let rows = body.as_array().ok_or_else(|| {
        AppError::ShapeError(format!(
            "expected the invoice webhook to return an array, got {}",
            json_kind(body)
        ))
    })?;

    let mut invoices = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match parse_invoice_item(row) {
            ItemOutcome::Parsed(invoice) => invoices.push(invoice),
            ItemOutcome::Skipped(reason) => {
                warn!(index, %reason, "skipping invoice row");
            }
        }
    }

    debug!(received = rows.len(), kept = invoices.len(), "normalized invoice webhook");
    Ok(invoices)
}

/// Normalises the travel webhook body.
///
/// Only the first row matters: its `json` field holds the voyage array and
/// its optional `info_travel` field the traveller information.
pub fn normalize_travel(body: &Value) -> Result<TravelListing> {
    let rows = body.as_array().ok_or_else(|| {
        AppError::ShapeError(format!(
            "expected the travel webhook to return an array, got {}",
            json_kind(body)
        ))
    })?;
    let first = rows
        .first()
        .ok_or_else(|| AppError::ShapeError("the travel webhook returned an empty array".to_string()))?;
    let embedded = first.get(JSON_FIELD).and_then(Value::as_str).ok_or_else(|| {
        AppError::ShapeError(format!(
            "expected a string '{}' field in the first travel row",
            JSON_FIELD
        ))
    })?;

    let voyages = parse_embedded_list::<Voyage>(embedded, "voyage");
    let country_info = parse_country_info(first.get(INFO_FIELD));

    debug!(voyages = voyages.len(), country_info = country_info.len(), "normalized travel webhook");
    Ok(TravelListing { voyages, country_info })
}

/// Parses the traveller information side channel.
///
/// Absent, non-string or malformed input yields an empty list.
pub fn parse_country_info(field: Option<&Value>) -> Vec<CountryInfo> {
    match field {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(embedded)) => parse_embedded_list::<CountryInfo>(embedded, "country info"),
        Some(other) => {
            warn!(kind = json_kind(other), "ignoring non-string '{}' field", INFO_FIELD);
            Vec::new()
        }
    }
}

fn parse_embedded_object<T: DeserializeOwned>(embedded: &str) -> ItemOutcome<T> {
    let value = match serde_json::from_str::<Value>(embedded) {
        Ok(value) => value,
        Err(e) => return ItemOutcome::Skipped(SkipReason::InvalidJson(e.to_string())),
    };
    record_from_value(value)
}

fn record_from_value<T: DeserializeOwned>(value: Value) -> ItemOutcome<T> {
    if !value.is_object() {
        return ItemOutcome::Skipped(SkipReason::NotStructured(json_kind(&value)));
    }
    match serde_json::from_value(value) {
        Ok(record) => ItemOutcome::Parsed(record),
        Err(e) => ItemOutcome::Skipped(SkipReason::UnexpectedFields(e.to_string())),
    }
}

/// Parses an embedded JSON array of records, dropping whatever does not fit.
fn parse_embedded_list<T: DeserializeOwned>(embedded: &str, what: &str) -> Vec<T> {
    let value = match serde_json::from_str::<Value>(embedded) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "embedded {} list does not parse, treating it as empty", what);
            return Vec::new();
        }
    };
    let Value::Array(entries) = value else {
        warn!(kind = json_kind(&value), "embedded {} list is not an array, treating it as empty", what);
        return Vec::new();
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match record_from_value::<T>(entry) {
            ItemOutcome::Parsed(record) => records.push(record),
            ItemOutcome::Skipped(reason) => {
                warn!(index, %reason, "skipping {} entry", what);
            }
        }
    }
    records
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
