use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;
use snitchdns_http::{
    CallContext, CreateRecordRequest, CreateZoneRequest, JsonObject, SnitchDnsClient,
    UpdateRecordRequest, UpdateZoneRequest,
};

#[cfg(feature = "harness")]
use snitchdns_http::harness::{ContainerRequest, SnitchDnsContainer};

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock must be after epoch")
        .as_millis()
}

struct Live {
    client: SnitchDnsClient,
    #[cfg(feature = "harness")]
    container: Option<SnitchDnsContainer>,
}

impl Live {
    async fn finish(self) {
        #[cfg(feature = "harness")]
        if let Some(container) = self.container {
            let _ = container.terminate().await;
        }
    }
}

/// Points at `SNITCHDNS_API_URL`/`SNITCHDNS_API_KEY` when set, otherwise at a
/// Docker container when built with `--features harness` and
/// `SNITCHDNS_TESTCONTAINER=1`.
async fn live_target() -> Option<Live> {
    if let Ok(client) = SnitchDnsClient::from_env() {
        return Some(Live {
            client,
            #[cfg(feature = "harness")]
            container: None,
        });
    }

    #[cfg(feature = "harness")]
    if std::env::var("SNITCHDNS_TESTCONTAINER").as_deref() == Ok("1") {
        let container = SnitchDnsContainer::start(ContainerRequest::default())
            .await
            .expect("test container must start");
        return Some(Live {
            client: container.client(),
            container: Some(container),
        });
    }

    None
}

#[tokio::test]
async fn live_zone_and_record_lifecycle() {
    let Some(live) = live_target().await else {
        eprintln!("skipping live test: SNITCHDNS_API_URL/SNITCHDNS_API_KEY not set");
        return;
    };
    let client = live.client.clone();
    let ctx = CallContext::with_timeout(Duration::from_secs(60));
    let domain = format!("live-{}.example.com", unique_suffix());

    let zone = client
        .create_zone(
            &ctx,
            &CreateZoneRequest {
                domain: domain.clone(),
                active: true,
                tags: "live".to_owned(),
                ..CreateZoneRequest::default()
            },
        )
        .await
        .expect("zone creation must succeed");
    assert_eq!(zone.domain, domain);

    let zone = client
        .update_zone(
            &ctx,
            zone.id,
            &UpdateZoneRequest {
                catch_all: Some(true),
                ..UpdateZoneRequest::default()
            },
        )
        .await
        .expect("zone update must succeed");
    assert!(zone.catch_all);

    let mut data = JsonObject::new();
    data.insert("address".to_owned(), json!("192.0.2.1"));
    let record = client
        .create_record(
            &ctx,
            zone.id,
            &CreateRecordRequest {
                active: true,
                class: "IN".to_owned(),
                record_type: "A".to_owned(),
                ttl: 300,
                data,
                ..CreateRecordRequest::default()
            },
        )
        .await
        .expect("record creation must succeed");

    let record = client
        .update_record(
            &ctx,
            zone.id,
            record.id,
            &UpdateRecordRequest {
                ttl: Some(600),
                ..UpdateRecordRequest::default()
            },
        )
        .await
        .expect("record update must succeed");
    assert_eq!(record.ttl, 600);

    let fetched = client
        .get_record(&ctx, zone.id, record.id)
        .await
        .expect("record fetch must succeed");
    assert_eq!(
        fetched.data.expect("record data must decode")["address"],
        "192.0.2.1"
    );

    client
        .delete_record(&ctx, zone.id, record.id)
        .await
        .expect("record delete must succeed");
    client
        .delete_zone(&ctx, zone.id)
        .await
        .expect("zone delete must succeed");

    let gone = client
        .get_zone(&ctx, zone.id)
        .await
        .expect_err("deleted zone must not be found");
    assert!(gone.is_not_found(), "unexpected error: {gone}");

    live.finish().await;
}
