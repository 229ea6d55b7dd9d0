use serde::Serialize;
use chrono::{DateTime, Utc};

use crate::records::{CountryInfo, ProcessedInvoice, Voyage};

#[derive(Serialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<ProcessedInvoice>,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TravelResponse {
    pub voyages: Vec<Voyage>,
    pub country_info: Vec<CountryInfo>,
    pub fetched_at: DateTime<Utc>,
}

/// Pretty-printed embedded JSON of a single invoice.
#[derive(Serialize)]
pub struct RawJsonResponse {
    pub index: usize,
    pub number: String,
    pub json: String,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub board: String,
    pub started: bool,
}
