use std::io;

use goyya_sms::{GoyyaClient, GoyyaConfig, SendRequest, SmsService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GoyyaConfig::from_env()?;
    let receiver = std::env::var("GOYYA_RECEIVER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GOYYA_RECEIVER environment variable is required",
        )
    })?;
    let message = std::env::var("GOYYA_MESSAGE")
        .unwrap_or_else(|_| "Hello from the goyya-sms demo.".to_owned());

    let service = if !config.username.trim().is_empty() {
        SmsService::new(GoyyaClient::from_config(&config)?)
    } else {
        SmsService::noop()
    };

    let request = SendRequest::new()
        .with_receiver(receiver)
        .with_message(message);
    let result = service.send(request).await?;
    println!(
        "successfully sent: {}, response: {:?}",
        result.successfully_sent,
        result.goyya_response()
    );

    Ok(())
}
