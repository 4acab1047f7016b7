mod config;
mod dashboard;
mod error;
mod gateway;
mod guard;
mod models;
mod notify;
mod panel;
mod render;
mod session;
mod storage;

use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::{BotConfig, CliArgs, Command, DashboardConfig, OWN_VESSELS};
use dashboard::Dashboard;
use error::DashboardError;
use gateway::{ApiClient, DashboardApi};
use notify::{Notification, Notifier};
use panel::{BotPanel, SelectionUpdate};
use session::SessionStore;
use storage::{FileStore, KeyValueStore};

struct App {
    config: DashboardConfig,
    store: Arc<dyn KeyValueStore>,
    session: SessionStore,
    client: ApiClient,
    notifier: Notifier,
    notifications: broadcast::Receiver<Notification>,
    cancel: CancellationToken,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, rendered output to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_tracker=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    let config = DashboardConfig::from_args(&args)?;
    info!("price-tracker v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.base_url);
    info!("Local storage: {:?}", config.state_file);

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_file));
    let session = SessionStore::new(store.clone(), config.bots);
    let client = ApiClient::new(config.base_url.clone(), session.clone())?;
    let notifier = Notifier::new();
    let notifications = notifier.subscribe();

    let mut app = App {
        config,
        store,
        session,
        client,
        notifier,
        notifications,
        cancel: CancellationToken::new(),
    };

    let result = run(&mut app, args.command).await;
    app.drain_notifications();
    app.cancel.cancel();
    result
}

async fn run(app: &mut App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            app.client.login(&username, &password).await?;
            println!("Logged in. Run `price-tracker dashboard` to open the dashboard.");
        }
        Command::Logout => {
            guard::logout(&app.session)?;
            println!("Logged out.");
        }
        Command::Dashboard => {
            guard::require_session(&app.session)?;
            run_dashboard(app).await?;
        }
        Command::Status { bot } => {
            guard::require_session(&app.session)?;
            let bots: Vec<BotConfig> = match bot {
                Some(name) => vec![app.bot(&name)?],
                None => app.config.bots.to_vec(),
            };
            for bot in bots {
                let panel = app.panel(bot);
                let (status, daily) =
                    tokio::join!(panel.refresh_status(), panel.refresh_daily_status());
                let view = panel.view().await;
                let daily_snapshot = panel.daily_status().await;
                print!("{}", render::render_status(bot.name, &view, daily_snapshot.as_ref()));
                app.drain_notifications();
                status?;
                daily?;
            }
        }
        Command::Start { bot } => {
            let panel = app.guarded_panel(&bot)?;
            panel.start_bot().await?;
            print_status(&panel).await;
        }
        Command::Stop { bot } => {
            let panel = app.guarded_panel(&bot)?;
            panel.stop_bot().await?;
            print_status(&panel).await;
        }
        Command::Toggle { bot } => {
            let panel = app.guarded_panel(&bot)?;
            panel.toggle_bot().await?;
            print_status(&panel).await;
        }
        Command::Competitors { bot } => {
            let panel = app.guarded_panel(&bot)?;
            panel.refresh_competitors().await?;
            print!("{}", render::render_competitors(&panel.competitors().await));
        }
        Command::Vessels => {
            guard::require_session(&app.session)?;
            print!("{}", render::render_own_vessels(OWN_VESSELS));
        }
        Command::Select {
            bot,
            date,
            competitor,
            vessel,
            own_vessel,
        } => {
            let panel = app.guarded_panel(&bot)?;
            let list_vessels = vessel.is_none();
            let outcome = panel
                .apply_selections(SelectionUpdate {
                    date,
                    competitor: competitor.clone(),
                    competitor_vessel: vessel,
                    own_vessel,
                })
                .await;
            if let Some(competitor) = competitor.filter(|_| list_vessels) {
                let vessels = panel.competitor_vessels().await;
                if !vessels.is_empty() {
                    println!("Vessels of {}:", competitor);
                    print!("{}", render::render_competitor_vessels(&vessels));
                }
            }
            println!("{} selections:", panel.bot().name);
            print!("{}", render::render_selections(&panel.view().await));
            outcome?;
        }
        Command::Compare { bot } => {
            let panel = app.guarded_panel(&bot)?;
            let outcome = panel.fetch_comparison().await;
            let view = panel.view().await;
            print!("{}", render::comparison_view(view.dataset()));
            outcome?;
        }
        Command::Reset { bot } => {
            let panel = app.guarded_panel(&bot)?;
            panel.reset().await;
        }
    }
    Ok(())
}

async fn run_dashboard(app: &mut App) -> anyhow::Result<()> {
    let api: Arc<dyn DashboardApi> = Arc::new(app.client.clone());
    let dashboard = Dashboard::new(
        app.config.bots,
        api,
        app.store.clone(),
        app.notifier.clone(),
        app.config.poll_interval,
    );

    dashboard.mount().await;
    print!("{}", dashboard.render().await);
    app.drain_notifications();

    let mut ticker = tokio::time::interval(app.config.poll_interval);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                print!("{}", dashboard.render().await);
                app.drain_notifications();
            }
        }
    }

    dashboard.unmount();
    Ok(())
}

async fn print_status(panel: &BotPanel) {
    let view = panel.view().await;
    let daily = panel.daily_status().await;
    print!("{}", render::render_status(panel.bot().name, &view, daily.as_ref()));
}

impl App {
    fn bot(&self, name: &str) -> Result<BotConfig, DashboardError> {
        self.config
            .bot(name)
            .ok_or_else(|| DashboardError::UnknownBot(name.to_string()))
    }

    fn panel(&self, bot: BotConfig) -> BotPanel {
        BotPanel::new(
            bot,
            Arc::new(self.client.clone()),
            self.store.clone(),
            self.notifier.clone(),
            self.config.poll_interval,
            &self.cancel,
        )
    }

    fn guarded_panel(&self, name: &str) -> Result<BotPanel, DashboardError> {
        guard::require_session(&self.session)?;
        Ok(self.panel(self.bot(name)?))
    }

    fn drain_notifications(&mut self) {
        loop {
            match self.notifications.try_recv() {
                Ok(n) => eprintln!("{}", n),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}
