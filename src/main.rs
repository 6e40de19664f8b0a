use novelmt_api::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("novelmt-api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    novelmt_api::run().await
}
