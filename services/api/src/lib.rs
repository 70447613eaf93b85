mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod watch;

use abuja_watch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
