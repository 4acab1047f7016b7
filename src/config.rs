use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::DashboardError;

/// Price Tracker — monitor boat-rental prices against competitors and control the pricing bot.
#[derive(Parser, Debug, Clone)]
#[command(name = "price-tracker")]
pub struct CliArgs {
    /// Base URL of the pricing backend
    #[arg(
        long = "base-url",
        env = "PRICE_TRACKER_API_URL",
        default_value = DEFAULT_API_BASE_URL,
        global = true
    )]
    pub base_url: String,

    /// File holding the local key-value store (session token, panel state)
    #[arg(long = "state-file", env = "PRICE_TRACKER_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and store the access token
    Login {
        #[arg(short = 'u', long)]
        username: String,
        #[arg(short = 'p', long)]
        password: String,
    },
    /// Clear the session and all cached panel state
    Logout,
    /// Mount both bot panels and keep refreshing until Ctrl+C
    Dashboard,
    /// Show bot status and daily status
    Status {
        #[arg(short = 'b', long)]
        bot: Option<String>,
    },
    /// Start the pricing bot
    Start {
        #[arg(short = 'b', long)]
        bot: String,
    },
    /// Stop the pricing bot
    Stop {
        #[arg(short = 'b', long)]
        bot: String,
    },
    /// Start the bot if it is not running, stop it otherwise
    Toggle {
        #[arg(short = 'b', long)]
        bot: String,
    },
    /// List competitors known to the backend
    Competitors {
        #[arg(short = 'b', long)]
        bot: String,
    },
    /// List our own vessels
    Vessels,
    /// Update the filter selections of a bot panel
    Select {
        #[arg(short = 'b', long)]
        bot: String,
        /// Date as dd.MM.yyyy or yyyy-mm-dd
        #[arg(short = 'd', long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Competitor lookup name
        #[arg(short = 'c', long)]
        competitor: Option<String>,
        /// Competitor vessel id
        #[arg(long)]
        vessel: Option<String>,
        /// Own vessel id
        #[arg(long = "own-vessel")]
        own_vessel: Option<String>,
    },
    /// Fetch and render the price comparison for the current selections
    Compare {
        #[arg(short = 'b', long)]
        bot: String,
    },
    /// Reset selections and the comparison dataset of a bot panel
    Reset {
        #[arg(short = 'b', long)]
        bot: String,
    },
}

/// A bot panel: the name shown in the UI and the id the daily-status endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotConfig {
    pub name: &'static str,
    pub id: u8,
}

impl BotConfig {
    pub fn state_key(&self) -> String {
        format!("{}{}", BOT_STATE_KEY_PREFIX, self.name)
    }
}

/// One of our own rentable vessels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnVessel {
    pub id: &'static str,
    pub name: &'static str,
}

pub struct DashboardConfig {
    pub base_url: Url,
    pub state_file: PathBuf,
    pub bots: &'static [BotConfig],
    pub poll_interval: Duration,
}

// Backend
pub const DEFAULT_API_BASE_URL: &str = "http://0.0.0.0:8000";

pub const LOGIN_PATH: &str = "/api/v1/login";
pub const COMPETITORS_PATH: &str = "/api/v1/competitor/yachts/details";
pub const COMPETITOR_VESSELS_PATH: &str = "/api/v1/competitor/yachts/names";
pub const BOT_STATUS_PATH: &str = "/api/v1/bot/status";
pub const BOT_DAILY_STATUS_PATH: &str = "/api/v1/bot/daily_status";
pub const BOT_START_PATH: &str = "/api/v1/bot/start";
pub const BOT_STOP_PATH: &str = "/api/v1/bot/stop";
pub const PRICE_COMPARE_PATH: &str = "/api/v1/prices/compare";

// Local storage keys
pub const TOKEN_KEY: &str = "token";
pub const BOT_STATE_KEY_PREFIX: &str = "botState_";
pub const STATE_FILE_NAME: &str = "local-storage.json";

// Panels
pub const STATUS_POLL_INTERVAL_SECS: u64 = 60;
pub const COMPARISON_DATE_FORMAT: &str = "%d.%m.%Y";
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

pub const BOTS: &[BotConfig] = &[
    BotConfig {
        name: "Nausys",
        id: 1,
    },
    BotConfig { name: "MMK", id: 2 },
];

pub const OWN_VESSELS: &[OwnVessel] = &[
    OwnVessel {
        id: "52110487",
        name: "Athena 5",
    },
    OwnVessel {
        id: "52110484",
        name: "Athena 2",
    },
    OwnVessel {
        id: "52110486",
        name: "Athena 4",
    },
    OwnVessel {
        id: "52071436",
        name: "Moana",
    },
    OwnVessel {
        id: "52110483",
        name: "Moana 2",
    },
];

impl DashboardConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self, DashboardError> {
        let base_url = Url::parse(&args.base_url)?;
        let state_file = args.state_file.clone().unwrap_or_else(default_state_file);

        Ok(DashboardConfig {
            base_url,
            state_file,
            bots: BOTS,
            poll_interval: Duration::from_secs(STATUS_POLL_INTERVAL_SECS),
        })
    }

    /// Look up a bot panel by name, ignoring case.
    pub fn bot(&self, name: &str) -> Option<BotConfig> {
        find_bot(self.bots, name)
    }
}

pub fn find_bot(bots: &[BotConfig], name: &str) -> Option<BotConfig> {
    bots.iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .copied()
}

pub fn own_vessel(id: &str) -> Option<&'static OwnVessel> {
    OWN_VESSELS.iter().find(|v| v.id == id)
}

/// Every storage key the dashboard writes panel state under.
pub fn bot_state_keys(bots: &[BotConfig]) -> Vec<String> {
    bots.iter().map(BotConfig::state_key).collect()
}

pub fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("price-tracker")
        .join(STATE_FILE_NAME)
}

/// Accepts the dashboard's `dd.MM.yyyy` form as well as ISO dates.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, COMPARISON_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{}', expected dd.MM.yyyy", raw))
}
