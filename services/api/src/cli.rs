use crate::report::{run_assessment, run_catalog, AssessArgs};
use crate::server;
use accreditation_ai::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "accreditation-advisor",
    about = "Score programme self-studies, predict accreditation outcomes, and draft advisory reports",
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
    /// Assess a self-study answer sheet and print the readiness report
    Assess(AssessArgs),
    /// Print the questionnaire sections, items, and disciplines
    Catalog,
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
        Command::Assess(args) => run_assessment(args).await,
        Command::Catalog => {
            run_catalog();
            Ok(())
        }
    }
}
