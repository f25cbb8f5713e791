use notify_relay::channels::{Notification, Recipient};
use notify_relay::config::DispatchConfig;
use notify_relay::dispatch::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DispatchConfig::from_env()?;
    let dispatcher = Dispatcher::from_env(config);

    // Demo recipient wired from the environment; the phone default keeps the
    // SMS mock reachable out of the box.
    let mut recipient = Recipient::new("demo-user");
    recipient.email = std::env::var("DEMO_EMAIL").ok();
    recipient.phone =
        Some(std::env::var("DEMO_PHONE").unwrap_or_else(|_| "+48111111111".to_string()));
    recipient.telegram_id = std::env::var("DEMO_TELEGRAM_ID").ok();

    let notification = Notification::new("Delivery check", "Hello! Test notification.");

    let result = dispatcher.notify(&recipient, &notification).await;
    if result.delivered {
        tracing::info!(status = %result.status, "notification delivered");
    } else {
        tracing::error!(status = %result.status, "notification failed");
    }

    Ok(())
}
