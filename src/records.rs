//! Typed records carried by the two webhooks.
//!
//! Webhook payloads are produced by a no-code workflow, so field types drift:
//! amounts show up as numbers one day and strings the next. Display fields are
//! therefore read through `lenient_string`, which turns any JSON value into
//! text instead of rejecting the record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One parsed invoice, as embedded in the invoice webhook's `json` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub supplier: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount_with_taxes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount_without_taxes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub taxes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deadline: String,
    #[serde(rename(deserialize = "devise"), default, deserialize_with = "lenient_string")]
    pub currency: String,
    #[serde(rename(deserialize = "resume"), default, deserialize_with = "lenient_string")]
    pub summary: String,
}

impl Invoice {
    pub fn has_taxes(&self) -> bool {
        !self.taxes.trim().is_empty()
    }
}

/// An invoice together with the raw embedded JSON it came from and its cleaned file URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedInvoice {
    pub parsed: Invoice,
    pub original_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Voyage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub permalink: String,
    #[serde(rename(deserialize = "image_principale"), default, deserialize_with = "lenient_string")]
    pub cover_image: String,
    /// HTML markup, rendered as-is.
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename(deserialize = "titre"), default, deserialize_with = "lenient_string")]
    pub title: String,
}

/// Traveller information for one destination country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    /// HTML markup, rendered as-is.
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TravelListing {
    pub voyages: Vec<Voyage>,
    pub country_info: Vec<CountryInfo>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn invoice_reads_wire_names_and_scalars() {
        let invoice: Invoice = serde_json::from_value(json!({
            "supplier": "ACME",
            "number": 42,
            "amount_with_taxes": 120.5,
            "taxes": null,
            "devise": "EUR",
            "resume": "Office chairs"
        }))
        .unwrap();

        assert_eq!(
            invoice,
            Invoice {
                supplier: "ACME".into(),
                number: "42".into(),
                amount_with_taxes: "120.5".into(),
                currency: "EUR".into(),
                summary: "Office chairs".into(),
                ..Invoice::default()
            }
        );
        assert!(!invoice.has_taxes());
    }

    #[test]
    fn voyage_maps_french_field_names() {
        let voyage: Voyage = serde_json::from_value(json!({
            "permalink": "/voyage/japon",
            "image_principale": "/img/japon.jpg",
            "description": "<p>Tokyo</p>",
            "titre": "Japon"
        }))
        .unwrap();

        assert_eq!(voyage.cover_image, "/img/japon.jpg");
        assert_eq!(voyage.title, "Japon");
    }

    #[test]
    fn country_info_requires_code_and_text() {
        assert!(serde_json::from_value::<CountryInfo>(json!({ "code": "JP" })).is_err());
    }
}
