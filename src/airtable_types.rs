use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

pub type Fields = Map<String, Value>;

#[derive(Deserialize, Debug)]
pub struct AirtableListResponse {
    pub records: Vec<AirtableRecord>,
    /// Present when more pages exist; we only ever read the first record.
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AirtableRecord {
    #[serde(default)]
    pub id: String,
    #[serde(
        rename = "createdTime",
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<OffsetDateTime>,
    pub fields: Fields,
}

impl AirtableRecord {
    pub fn name(&self) -> Option<&str> {
        self.fields.get("Name").and_then(Value::as_str)
    }
}

/// `{Phone}='<phone>'`, with the phone escaped as an Airtable string literal.
pub fn phone_formula(phone: &str) -> String {
    let escaped = phone.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{Phone}}='{escaped}'")
}
