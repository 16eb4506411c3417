use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use sheets_json_proxy::sheets::SheetsClient;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    sheets_json_proxy::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let client = SheetsClient::new()?;

    run(service_fn(|request: LambdaEvent<ApiGatewayProxyRequest>| {
        sheets_json_proxy::lambda::function_handler(&client, request)
    }))
    .await
}
