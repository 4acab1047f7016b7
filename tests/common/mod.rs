#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use price_tracker::config::BotConfig;
use price_tracker::error::DashboardError;
use price_tracker::gateway::DashboardApi;
use price_tracker::models::*;
use price_tracker::notify::Notifier;
use price_tracker::panel::BotPanel;
use price_tracker::storage::{KeyValueStore, MemoryStore};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

pub const NAUSYS: BotConfig = BotConfig {
    name: "Nausys",
    id: 1,
};

/// In-process backend double that counts calls and records queries.
#[derive(Default)]
pub struct FakeApi {
    pub competitors_calls: AtomicUsize,
    pub vessels_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub daily_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub compare_calls: AtomicUsize,
    pub fail_competitors: Mutex<bool>,
    pub fail_vessels: Mutex<bool>,
    pub fail_compare: Mutex<bool>,
    pub status: Mutex<Option<BotStatusResponse>>,
    pub rows: Mutex<Vec<ComparisonRow>>,
    pub daily_bot_ids: Mutex<Vec<u8>>,
    pub vessel_queries: Mutex<Vec<String>>,
    pub compare_queries: Mutex<Vec<ComparisonQuery>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn failure() -> DashboardError {
    DashboardError::RequestFailed(StatusCode::INTERNAL_SERVER_ERROR)
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn competitors(&self) -> Result<Vec<Competitor>, DashboardError> {
        self.competitors_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_competitors.lock().unwrap() {
            return Err(failure());
        }
        Ok(vec![competitor("X", "Competitor X")])
    }

    async fn competitor_vessels(
        &self,
        competitor_name: &str,
    ) -> Result<Vec<CompetitorVessel>, DashboardError> {
        self.vessels_calls.fetch_add(1, Ordering::SeqCst);
        self.vessel_queries
            .lock()
            .unwrap()
            .push(competitor_name.to_string());
        if *self.fail_vessels.lock().unwrap() {
            return Err(failure());
        }
        Ok(vec![CompetitorVessel {
            name: format!("{} One", competitor_name),
            id: format!("{}-1", competitor_name),
        }])
    }

    async fn bot_status(&self) -> Result<BotStatusResponse, DashboardError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .status
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(BotStatusResponse {
                status: BotStatus::Running,
                last_run: Some("2024-06-01T10:00:00Z".to_string()),
                next_run: Some("2024-06-01T11:00:00Z".to_string()),
            }))
    }

    async fn daily_status(&self, bot_id: u8) -> Result<DailyStatus, DashboardError> {
        self.daily_calls.fetch_add(1, Ordering::SeqCst);
        self.daily_bot_ids.lock().unwrap().push(bot_id);
        Ok(DailyStatus {
            bot_id,
            status: "completed".to_string(),
            last_update_date: Some("01.06.2024".to_string()),
            timestamp: None,
        })
    }

    async fn start_bot(&self) -> Result<BotActionResponse, DashboardError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BotActionResponse {
            status: BotStatus::Running,
            last_run: None,
            next_run: None,
            message: Some("Bot started".to_string()),
        })
    }

    async fn stop_bot(&self) -> Result<BotActionResponse, DashboardError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BotActionResponse {
            status: BotStatus::Stopped,
            last_run: None,
            next_run: None,
            message: Some("Bot stopped".to_string()),
        })
    }

    async fn compare_prices(
        &self,
        query: &ComparisonQuery,
    ) -> Result<Vec<ComparisonRow>, DashboardError> {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        self.compare_queries.lock().unwrap().push(query.clone());
        if *self.fail_compare.lock().unwrap() {
            return Err(failure());
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

pub fn competitor(name: &str, label: &str) -> Competitor {
    Competitor {
        id: format!("{}-id", name),
        competitor_name: name.to_string(),
        click_text: label.to_string(),
        search_text: None,
        yacht_ids: Default::default(),
    }
}

pub fn row(list_price: f64, status: u8) -> ComparisonRow {
    ComparisonRow {
        date: "01.06.2024 - 08.06.2024".to_string(),
        own_location: "Gocek".to_string(),
        competitor_location: "Fethiye".to_string(),
        own_price: 3200.0,
        competitor_price: 3050.5,
        competitor_list_price: list_price,
        discount_type: "Early booking".to_string(),
        discount_percentage: "10%".to_string(),
        commission_percentage: "20%".to_string(),
        commission: 610.0,
        price_difference: 149.5,
        status,
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub notifier: Notifier,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            api: FakeApi::new(),
            store: Arc::new(MemoryStore::new()),
            notifier: Notifier::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn panel(&self, bot: BotConfig) -> Arc<BotPanel> {
        let api: Arc<dyn DashboardApi> = self.api.clone();
        let store: Arc<dyn KeyValueStore> = self.store.clone();
        Arc::new(BotPanel::new(
            bot,
            api,
            store,
            self.notifier.clone(),
            Duration::from_secs(60),
            &self.cancel,
        ))
    }
}
