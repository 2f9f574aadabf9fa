//! Threadline entry point.
//!
//! Binary name: `threadline`
//!
//! Loads configuration, initializes tracing, then either serves the Slack
//! webhook or runs a one-shot inspection command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use threadline_infra::config::{load_config, resolve_data_dir};
use threadline_observe::tracing_setup::{
    TracingOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

use cli::{Cli, Commands, ConversationCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "threadline", &mut std::io::stdout());
        return Ok(());
    }

    let default_filter = if cli.quiet {
        "error"
    } else {
        filter_for_verbosity(cli.verbose)
    };
    init_tracing(&TracingOptions {
        default_filter: default_filter.to_string(),
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir();
    let mut config = load_config(&data_dir).await;

    let result = match cli.command {
        Commands::Serve(args) => {
            args.apply(&mut config);
            cli::serve::run(config, data_dir).await
        }
        Commands::Conversation { action } => match action {
            ConversationCommand::Show { thread_id } => {
                cli::conversation::show(&config, &data_dir, &thread_id, cli.json).await
            }
        },
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
