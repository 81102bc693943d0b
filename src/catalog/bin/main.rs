use lambda_http::Error;
use virtual_library::catalog::server::serve;
use virtual_library::core::domain::Configuration;
use virtual_library::utils::logging::setup_tracing;

// Runs behind API Gateway when started by the Lambda runtime, otherwise
// listens on LIBRARY_BIND_ADDR.
// See https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();
    let config = Configuration::from_env();
    serve(config).await
}
