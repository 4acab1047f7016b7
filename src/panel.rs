//! Bot panel controller.
//!
//! One [`BotPanel`] per configured bot. It owns the panel's view-model,
//! mirrors every change to local storage under `botState_<name>`, fetches
//! from the backend through [`DashboardApi`], and keeps the bot status fresh
//! with a background poller. All async work runs under the panel's
//! cancellation token; [`BotPanel::unmount`] cancels it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::error::DashboardError;
use crate::gateway::DashboardApi;
use crate::models::*;
use crate::notify::Notifier;
use crate::storage::KeyValueStore;

/// Persisted state of a bot panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotViewModel {
    pub status: BotStatus,
    pub last_run: Option<String>,
    pub next_run: Option<String>,
    pub date: Option<NaiveDate>,
    pub selected_competitor: Option<String>,
    pub selected_competitor_vessel: Option<String>,
    pub selected_own_vessel: Option<String>,
    pub price_data: Vec<ComparisonRow>,
    /// Set once a comparison fetch has completed; `None` means nothing was fetched yet.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl BotViewModel {
    /// A competitor vessel id only makes sense for the competitor it was picked under.
    pub fn select_competitor(&mut self, competitor_name: impl Into<String>) {
        self.selected_competitor = Some(competitor_name.into());
        self.selected_competitor_vessel = None;
    }

    pub fn apply_status(&mut self, status: BotStatus, last_run: Option<String>, next_run: Option<String>) {
        self.status = status;
        self.last_run = last_run;
        self.next_run = next_run;
    }

    /// Clear selections and the dataset. The operational status stays.
    pub fn reset_selections(&mut self) {
        *self = BotViewModel {
            status: self.status,
            last_run: self.last_run.take(),
            next_run: self.next_run.take(),
            ..BotViewModel::default()
        };
    }

    /// The comparison request for the current selections, if all four are set.
    pub fn comparison_query(&self) -> Option<ComparisonQuery> {
        let present = |s: &Option<String>| s.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        Some(ComparisonQuery {
            date: self.date?,
            competitor_name: present(&self.selected_competitor)?,
            competitor_vessel_id: present(&self.selected_competitor_vessel)?,
            own_vessel_id: present(&self.selected_own_vessel)?,
        })
    }

    /// The last fetched dataset, or `None` if no fetch has completed.
    pub fn dataset(&self) -> Option<&[ComparisonRow]> {
        self.fetched_at.map(|_| self.price_data.as_slice())
    }
}

pub fn load_view_model(store: &dyn KeyValueStore, bot: &BotConfig) -> BotViewModel {
    let key = bot.state_key();
    match store.get(&key) {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Discarding unreadable state for {}: {}", bot.name, e);
            BotViewModel::default()
        }),
        None => BotViewModel::default(),
    }
}

pub fn save_view_model(
    store: &dyn KeyValueStore,
    bot: &BotConfig,
    view: &BotViewModel,
) -> Result<(), DashboardError> {
    let json = serde_json::to_string(view).map_err(crate::error::StorageError::from)?;
    store.set(&bot.state_key(), &json)?;
    Ok(())
}

/// Selections set together from one `select` invocation.
#[derive(Debug, Clone, Default)]
pub struct SelectionUpdate {
    pub date: Option<NaiveDate>,
    pub competitor: Option<String>,
    pub competitor_vessel: Option<String>,
    pub own_vessel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelPhase {
    Uninitialized,
    Idle,
    Loading,
    ErrorShown,
}

pub struct BotPanel {
    bot: BotConfig,
    api: Arc<dyn DashboardApi>,
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    poll_interval: Duration,
    view: RwLock<BotViewModel>,
    competitors: RwLock<Vec<Competitor>>,
    competitor_vessels: RwLock<Vec<CompetitorVessel>>,
    daily_status: RwLock<Option<DailyStatus>>,
    phase: RwLock<PanelPhase>,
    cancel: CancellationToken,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl BotPanel {
    /// Build a panel and hydrate its view-model from storage.
    ///
    /// The panel's token is a child of `parent`, so cancelling the parent
    /// tears down every panel created from it.
    pub fn new(
        bot: BotConfig,
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn KeyValueStore>,
        notifier: Notifier,
        poll_interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let view = load_view_model(store.as_ref(), &bot);
        Self {
            bot,
            api,
            store,
            notifier,
            poll_interval,
            view: RwLock::new(view),
            competitors: RwLock::new(Vec::new()),
            competitor_vessels: RwLock::new(Vec::new()),
            daily_status: RwLock::new(None),
            phase: RwLock::new(PanelPhase::Uninitialized),
            cancel: parent.child_token(),
            poller: Mutex::new(None),
        }
    }

    pub fn bot(&self) -> BotConfig {
        self.bot
    }

    pub async fn view(&self) -> BotViewModel {
        self.view.read().await.clone()
    }

    pub async fn competitors(&self) -> Vec<Competitor> {
        self.competitors.read().await.clone()
    }

    pub async fn competitor_vessels(&self) -> Vec<CompetitorVessel> {
        self.competitor_vessels.read().await.clone()
    }

    pub async fn daily_status(&self) -> Option<DailyStatus> {
        self.daily_status.read().await.clone()
    }

    pub async fn phase(&self) -> PanelPhase {
        *self.phase.read().await
    }

    pub fn is_mounted(&self) -> bool {
        self.poller
            .lock()
            .map(|p| p.is_some())
            .unwrap_or(false)
    }

    /// Fetch competitors, status and daily status concurrently and arm the status poller.
    ///
    /// A failed fetch is reported and leaves the other two untouched.
    pub async fn mount(self: &Arc<Self>) {
        info!("Mounting {} panel", self.bot.name);
        self.set_phase(PanelPhase::Idle).await;
        self.arm_status_poller();

        let _ = tokio::join!(
            self.refresh_competitors(),
            self.refresh_status(),
            self.refresh_daily_status(),
        );
    }

    /// Cancel the poller and every in-flight request of this panel.
    pub fn unmount(&self) {
        info!("Unmounting {} panel", self.bot.name);
        self.cancel.cancel();
        if let Ok(mut poller) = self.poller.lock() {
            poller.take();
        }
    }

    fn arm_status_poller(self: &Arc<Self>) {
        let Ok(mut poller) = self.poller.lock() else {
            return;
        };
        if poller.is_some() || self.cancel.is_cancelled() {
            return;
        }

        let panel = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        let period = self.poll_interval;
        let name = self.bot.name;
        *poller = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(panel) = panel.upgrade() else { break };
                        debug!("Polling status for {}", name);
                        let _ = panel.refresh_status().await;
                    }
                }
            }
            debug!("Status poller for {} stopped", name);
        }));
    }

    pub async fn refresh_competitors(&self) -> Result<(), DashboardError> {
        match self.cancellable(self.api.competitors()).await {
            Ok(list) => {
                debug!("{}: {} competitors", self.bot.name, list.len());
                *self.competitors.write().await = list;
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to fetch competitors").await),
        }
    }

    pub async fn refresh_status(&self) -> Result<(), DashboardError> {
        match self.cancellable(self.api.bot_status()).await {
            Ok(resp) => {
                self.update_view(|v| v.apply_status(resp.status, resp.last_run, resp.next_run))
                    .await;
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to fetch bot status").await),
        }
    }

    pub async fn refresh_daily_status(&self) -> Result<(), DashboardError> {
        match self.cancellable(self.api.daily_status(self.bot.id)).await {
            Ok(snapshot) => {
                *self.daily_status.write().await = Some(snapshot);
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to fetch daily status").await),
        }
    }

    pub async fn select_date(&self, date: Option<NaiveDate>) {
        self.update_view(|v| v.date = date).await;
    }

    /// Select a competitor, drop the previous vessel choice and load the competitor's vessels.
    pub async fn select_competitor(&self, competitor_name: &str) -> Result<(), DashboardError> {
        let name = competitor_name.to_string();
        self.update_view(|v| v.select_competitor(name)).await;

        match self
            .cancellable(self.api.competitor_vessels(competitor_name))
            .await
        {
            Ok(vessels) => {
                *self.competitor_vessels.write().await = vessels;
                Ok(())
            }
            Err(e) => {
                self.competitor_vessels.write().await.clear();
                Err(self.report(e, "Failed to fetch competitor yachts").await)
            }
        }
    }

    pub async fn select_competitor_vessel(&self, vessel_id: Option<String>) {
        self.update_view(|v| v.selected_competitor_vessel = vessel_id)
            .await;
    }

    pub async fn select_own_vessel(&self, vessel_id: Option<String>) {
        self.update_view(|v| v.selected_own_vessel = vessel_id).await;
    }

    /// Apply every given selection. A failed vessel-list fetch for the
    /// competitor is returned only after the remaining selections are stored.
    pub async fn apply_selections(&self, update: SelectionUpdate) -> Result<(), DashboardError> {
        if let Some(date) = update.date {
            self.select_date(Some(date)).await;
        }
        let outcome = match update.competitor {
            Some(competitor) => self.select_competitor(&competitor).await,
            None => Ok(()),
        };
        if let Some(vessel) = update.competitor_vessel {
            self.select_competitor_vessel(Some(vessel)).await;
        }
        if let Some(own_vessel) = update.own_vessel {
            self.select_own_vessel(Some(own_vessel)).await;
        }
        outcome
    }

    /// Fetch the comparison for the current selections.
    ///
    /// Without all four selections nothing is sent and the dataset is left as is.
    pub async fn fetch_comparison(&self) -> Result<(), DashboardError> {
        let query = self.view.read().await.comparison_query();
        let Some(query) = query else {
            self.notifier
                .error(self.bot.name, "Please select all required fields");
            self.set_phase(PanelPhase::ErrorShown).await;
            return Err(DashboardError::MissingSelections);
        };

        self.set_phase(PanelPhase::Loading).await;
        info!(
            "{}: fetching comparison for {} / {} / {}",
            self.bot.name, query.competitor_name, query.competitor_vessel_id, query.own_vessel_id
        );

        match self.cancellable(self.api.compare_prices(&query)).await {
            Ok(rows) => {
                self.update_view(|v| {
                    v.price_data = rows;
                    v.fetched_at = Some(Utc::now());
                })
                .await;
                self.set_phase(PanelPhase::Idle).await;
                Ok(())
            }
            Err(e) => {
                // report() moves the phase to ErrorShown unless cancelled
                self.set_phase(PanelPhase::Idle).await;
                Err(self.report(e, "Failed to fetch price data").await)
            }
        }
    }

    /// Back to empty selections and dataset. Status and daily status are kept.
    pub async fn reset(&self) {
        self.update_view(BotViewModel::reset_selections).await;
        self.competitor_vessels.write().await.clear();
        self.set_phase(PanelPhase::Idle).await;
        self.notifier
            .info(self.bot.name, "Reset", "All selections have been reset");
    }

    /// Stop the bot if it is running, start it otherwise.
    pub async fn toggle_bot(&self) -> Result<(), DashboardError> {
        let running = self.view.read().await.status.is_running();
        if running {
            self.stop_bot().await
        } else {
            self.start_bot().await
        }
    }

    pub async fn start_bot(&self) -> Result<(), DashboardError> {
        match self.cancellable(self.api.start_bot()).await {
            Ok(resp) => {
                self.apply_action(resp, "Bot Started").await;
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to start bot").await),
        }
    }

    pub async fn stop_bot(&self) -> Result<(), DashboardError> {
        match self.cancellable(self.api.stop_bot()).await {
            Ok(resp) => {
                self.apply_action(resp, "Bot Stopped").await;
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to stop bot").await),
        }
    }

    async fn apply_action(&self, resp: BotActionResponse, title: &str) {
        let message = resp.message.unwrap_or_default();
        self.update_view(|v| v.apply_status(resp.status, resp.last_run, resp.next_run))
            .await;
        self.notifier.info(self.bot.name, title, message);
    }

    async fn update_view(&self, apply: impl FnOnce(&mut BotViewModel)) {
        let mut view = self.view.write().await;
        apply(&mut view);
        if let Err(e) = save_view_model(self.store.as_ref(), &self.bot, &view) {
            warn!("Failed to persist {} panel state: {}", self.bot.name, e);
        }
    }

    async fn set_phase(&self, phase: PanelPhase) {
        *self.phase.write().await = phase;
    }

    async fn cancellable<T>(
        &self,
        fut: impl Future<Output = Result<T, DashboardError>>,
    ) -> Result<T, DashboardError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DashboardError::Cancelled),
            result = fut => result,
        }
    }

    /// Surface a failure to the user. Cancellation is silent.
    async fn report(&self, err: DashboardError, description: &str) -> DashboardError {
        if matches!(err, DashboardError::Cancelled) {
            debug!("{}: {} (cancelled)", self.bot.name, description);
            return err;
        }
        warn!("{}: {}: {}", self.bot.name, description, err);
        self.notifier.error(self.bot.name, description);
        self.set_phase(PanelPhase::ErrorShown).await;
        err
    }
}

impl Drop for BotPanel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
