//! Wiring & DI. Entry point: bootstrap adapters, inject into the service, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use welfare_notify::adapters::persistence::{ReportStore, UserDirectory};
use welfare_notify::adapters::sms::{AfricasTalkingSms, ConsoleSms};
use welfare_notify::adapters::ui::tui::TuiInputPort;
use welfare_notify::ports::{InputPort, SmsService, UserService};
use welfare_notify::shared::config::AppConfig;
use welfare_notify::usecases::{BulkMessageService, StandardContextFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });
    let organization = cfg.organization_or_default();

    welfare_notify::adapters::ui::init_ui(&organization);

    // --- Users (read-only export of the members collection) ---
    let users_path = cfg.users_file_or_default();
    let users = Arc::new(
        UserDirectory::open(&users_path)
            .await
            .map_err(|e| anyhow::anyhow!("{} (set WELFARE_USERS_FILE)", e))?,
    );

    // --- SMS provider (dry run when Africa's Talking is not configured) ---
    let sms: Arc<dyn SmsService> = if cfg.is_sms_configured() {
        let url = cfg.at_api_url_or_default();
        info!(url = %url, "Africa's Talking SMS enabled");
        Arc::new(AfricasTalkingSms::new(
            url,
            cfg.at_username().unwrap_or_default(),
            cfg.at_api_key().unwrap_or_default(),
            cfg.at_sender_id.clone(),
        ))
    } else {
        warn!("AT_USERNAME / AT_API_KEY not set, messages will only be logged (dry run)");
        Arc::new(ConsoleSms::new())
    };

    // --- Service ---
    let concurrency = cfg.send_concurrency_or_default();
    info!(concurrency, "bulk send concurrency: {}", concurrency);
    let service = Arc::new(
        BulkMessageService::builder()
            .user_service(Arc::clone(&users) as Arc<dyn UserService>)
            .sms_service(sms)
            .context_factory(Arc::new(StandardContextFactory::new(organization)))
            .concurrency(concurrency)
            .build()?,
    );

    let reports = Arc::new(ReportStore::new(cfg.reports_dir()));
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(service, users, reports));

    // --- Run (main menu -> Send / Retry / Reload) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
