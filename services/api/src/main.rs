mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use visatrack::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    cli::run().await
}
