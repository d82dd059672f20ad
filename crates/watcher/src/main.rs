use statusbot_common::config::Settings;
use statusbot_watcher::api::PracticumClient;
use statusbot_watcher::poller::Watcher;
use statusbot_watcher::telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statusbot=info".into()),
        )
        .init();

    tracing::info!("Homework-status watcher starting...");

    // Load configuration; a missing credential is the one fatal condition
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "Configuration check failed");
            std::process::exit(2);
        }
    };

    let api = PracticumClient::new(&settings)?;
    let messenger = TelegramMessenger::new(&settings)?;
    let mut watcher = Watcher::new(&settings, api, messenger);

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        () = watcher.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Homework-status watcher stopped.");
    Ok(())
}
