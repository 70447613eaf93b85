use crate::demo::{run_demo, DemoArgs};
use crate::server;
use crate::watch::{run_dashboard, run_watch, DashboardArgs, WatchArgs};
use abuja_watch::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Abuja Watch",
    about = "Collect and monitor ward collation observations for the FCT area councils",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Poll a running service and print the dashboard on every refresh
    Watch(WatchArgs),
    /// Fetch and print the dashboard once
    Dashboard(DashboardArgs),
    /// Seed an in-memory election and print the resulting dashboard
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Watch(args) => run_watch(args).await,
        Command::Dashboard(args) => run_dashboard(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
