use std::time::Duration;

use snitchdns_http::{CallContext, ClientOptions, CreateZoneRequest, SnitchDnsClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snitchdns_http=debug")),
        )
        .init();

    let client = SnitchDnsClient::from_env()?.with_options(ClientOptions {
        debug_logging: true,
        ..ClientOptions::default()
    });

    let ctx = CallContext::with_timeout(Duration::from_secs(90));
    let zone = client
        .create_zone(
            &ctx,
            &CreateZoneRequest {
                domain: "demo.example.com".to_owned(),
                active: true,
                ..CreateZoneRequest::default()
            },
        )
        .await?;
    println!("created zone {} ({})", zone.id, zone.domain);

    let zone = client.get_zone(&ctx, zone.id).await?;
    println!("{zone:?}");

    client.delete_zone(&ctx, zone.id).await?;
    println!("deleted zone {}", zone.id);

    Ok(())
}
