use customer_service::context::Context;
use customer_service::{CustomerAccount, StoreContext, UpdateRequest};
use serde::Deserialize;
use service_core::telemetry::logging::{init_subscriber, make_subscriber};
use tokio::io::AsyncReadExt;
use tonic::Status;

/// Update document read from stdin. The account is the one the caller loaded and authenticated.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountInput {
    account: CustomerAccount,
    store_id: u32,
    request: UpdateRequest,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_subscriber(make_subscriber("customer_service", "info"))?;

    let ctx = Context::from_env()?;
    let coordinator = ctx.coordinator().await?;

    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await?;
    let mut input: UpdateAccountInput = serde_json::from_str(&raw)?;

    coordinator
        .execute(
            &mut input.account,
            &input.request,
            &StoreContext {
                store_id: input.store_id,
            },
        )
        .await
        .map_err(Status::from)?;

    println!("{}", serde_json::to_string(&input.account)?);

    Ok(())
}
