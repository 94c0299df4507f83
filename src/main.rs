use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use tenant_onboard::config::OnboardingConfig;
use tenant_onboard::input::CsvTokenizer;
use tenant_onboard::onboarding::{OnboardingEngine, StateStore};
use tenant_onboard::platform::{HttpPlatformClient, PlatformApi};
use tenant_onboard::rpc;
use tenant_onboard::tools::ToolRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries protocol responses, so logs go to stderr or a file.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _log_guard = match std::env::var("ONBOARD_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tenant-onboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    };

    let config = OnboardingConfig::from_env().context("Failed to load configuration")?;

    let api: Arc<dyn PlatformApi> = Arc::new(
        HttpPlatformClient::new(&config.api).context("Failed to build platform API client")?,
    );
    if !api.is_authenticated() {
        tracing::warn!("ONBOARD_USER_TOKEN not set; onboarding operations will be refused");
    }

    let store = StateStore::new(&config.state_dir);
    let known = store.tenants().await.unwrap_or_default();

    let state_dir = store.base_path().display().to_string();
    let engine = Arc::new(
        OnboardingEngine::new(store, api)
            .with_tokenizer(Arc::new(CsvTokenizer::new(config.csv_delimiter)))
            .with_booking_defaults(config.bookings),
    );

    let tools = ToolRegistry::new();
    tools.register_onboarding_tools(Arc::clone(&engine));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %state_dir,
        api = %config.api.base_url,
        tools = tools.count(),
        sessions = known.len(),
        "tenant-onboard ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Error reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = rpc::handle_line(&tools, line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
