use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{find_bot, BotConfig};
use crate::gateway::DashboardApi;
use crate::notify::Notifier;
use crate::panel::BotPanel;
use crate::render::{comparison_view, render_status};
use crate::storage::KeyValueStore;

/// The dashboard page: one independent panel per bot.
pub struct Dashboard {
    bots: &'static [BotConfig],
    panels: Vec<Arc<BotPanel>>,
    cancel: CancellationToken,
}

impl Dashboard {
    pub fn new(
        bots: &'static [BotConfig],
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn KeyValueStore>,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let panels = bots
            .iter()
            .map(|bot| {
                Arc::new(BotPanel::new(
                    *bot,
                    api.clone(),
                    store.clone(),
                    notifier.clone(),
                    poll_interval,
                    &cancel,
                ))
            })
            .collect();
        Self {
            bots,
            panels,
            cancel,
        }
    }

    pub fn panels(&self) -> &[Arc<BotPanel>] {
        &self.panels
    }

    pub fn panel(&self, name: &str) -> Option<&Arc<BotPanel>> {
        let bot = find_bot(self.bots, name)?;
        self.panels.iter().find(|p| p.bot() == bot)
    }

    /// Mount every panel concurrently and wait for their initial fetches.
    pub async fn mount(&self) {
        info!("Mounting dashboard with {} panels", self.panels.len());
        let mut set = JoinSet::new();
        for panel in &self.panels {
            let panel = panel.clone();
            set.spawn(async move { panel.mount().await });
        }
        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                warn!("Panel mount task failed: {}", e);
            }
        }
    }

    /// Cancel every panel's poller and in-flight requests.
    pub fn unmount(&self) {
        info!("Unmounting dashboard");
        self.cancel.cancel();
        for panel in &self.panels {
            panel.unmount();
        }
    }

    pub async fn render(&self) -> String {
        let mut out = String::new();
        for panel in &self.panels {
            let view = panel.view().await;
            let daily = panel.daily_status().await;
            out.push_str(&render_status(panel.bot().name, &view, daily.as_ref()));
            out.push_str(&comparison_view(view.dataset()).to_string());
            out.push('\n');
        }
        out
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
