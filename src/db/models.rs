use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Hardware specification shared by zero or more displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub model_no: String,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub depth: f64,
    pub screen_size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct DigitalDisplay {
    pub serial_no: String,
    pub scheduler_system: String,
    pub model_no: String,
}
