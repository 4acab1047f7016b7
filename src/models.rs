//! Wire types exchanged with the pricing backend.
//!
//! Every response is decoded into one of these types before it reaches a
//! panel. A body that does not match fails with
//! [`DashboardError::Decode`](crate::error::DashboardError::Decode).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::COMPARISON_DATE_FORMAT;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Operational state reported by `/bot/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Running,
    Stopped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl BotStatus {
    pub fn is_running(self) -> bool {
        self == BotStatus::Running
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotStatus::Running => "running",
            BotStatus::Stopped => "stopped",
            BotStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotStatusResponse {
    pub status: BotStatus,
    pub last_run: Option<String>,
    pub next_run: Option<String>,
}

/// Reply to a start or stop request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotActionResponse {
    pub status: BotStatus,
    pub last_run: Option<String>,
    pub next_run: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatus {
    pub bot_id: u8,
    pub status: String,
    #[serde(alias = "last_update")]
    pub last_update_date: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(rename = "_id")]
    pub id: String,
    /// Name the backend looks competitors up by.
    pub competitor_name: String,
    /// Label shown in the competitor picker.
    pub click_text: String,
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub yacht_ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorVessel {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorVesselsResponse {
    #[serde(default)]
    pub yachts: Vec<CompetitorVessel>,
}

/// One line of the price comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(rename = "tarih")]
    pub date: String,
    #[serde(rename = "bizim_konum")]
    pub own_location: String,
    #[serde(rename = "rakip_konum")]
    pub competitor_location: String,
    #[serde(rename = "bizim_fiyat")]
    pub own_price: f64,
    #[serde(rename = "rakip_fiyat")]
    pub competitor_price: f64,
    #[serde(rename = "rakip_list_price")]
    pub competitor_list_price: f64,
    pub discount_type: String,
    pub discount_percentage: String,
    pub commission_percentage: String,
    pub commission: f64,
    #[serde(rename = "fark")]
    pub price_difference: f64,
    #[serde(rename = "durum")]
    pub status: u8,
}

/// Filters sent to `/prices/compare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonQuery {
    pub date: NaiveDate,
    pub competitor_name: String,
    pub competitor_vessel_id: String,
    pub own_vessel_id: String,
}

impl ComparisonQuery {
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("date_str", self.date.format(COMPARISON_DATE_FORMAT).to_string()),
            ("competitor_name", self.competitor_name.clone()),
            ("yacht_id", self.competitor_vessel_id.clone()),
            ("yacht_id_sailamor", self.own_vessel_id.clone()),
        ]
    }
}

/// Traffic-light outcome of a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndicator {
    Ok,
    Alert,
    Warning,
}

impl RowIndicator {
    /// 0 is ok, 1 is alert, anything else is a warning.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RowIndicator::Ok,
            1 => RowIndicator::Alert,
            _ => RowIndicator::Warning,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RowIndicator::Ok => "ok",
            RowIndicator::Alert => "alert",
            RowIndicator::Warning => "warning",
        }
    }
}

impl ComparisonRow {
    pub fn indicator(&self) -> RowIndicator {
        RowIndicator::from_code(self.status)
    }
}
