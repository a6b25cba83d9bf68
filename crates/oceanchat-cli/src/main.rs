mod config;
mod render;
mod repl;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use oceanchat_api::{HttpBackend, RequestPolicy};
use oceanchat_core::ChatClient;

use crate::config::Config;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "oceanchat")]
#[command(about = "Terminal client for an HTTP chat service", long_about = None)]
struct Cli {
    /// Backend base URL (overrides OCEANCHAT_API_BASE and the config file).
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Interactive chat session")]
    Chat {
        #[arg(short = 'm', long)]
        model: Option<String>,
        #[arg(short = 's', long)]
        session: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
    },
    #[command(about = "List available models")]
    Models,
    #[command(about = "List chat sessions")]
    Sessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let base_url = config.resolve_api_base(cli.url.as_deref());
    tracing::debug!(%base_url, "resolved backend address");
    let mut backend = HttpBackend::new(base_url.as_str());
    if let Some(secs) = config.request_timeout_secs {
        backend = backend.with_policy(RequestPolicy {
            timeout: Duration::from_secs(secs),
        });
    }
    let client = ChatClient::new(Arc::new(backend));
    client.bootstrap().await;

    match cli.command {
        None => run_chat(client, None, None, config.system_prompt.clone()).await,
        Some(Commands::Chat {
            model,
            session,
            system_prompt,
        }) => {
            let system_prompt = system_prompt.or_else(|| config.system_prompt.clone());
            run_chat(client, model, session, system_prompt).await
        }
        Some(Commands::Models) => {
            let state = client.state().await;
            render::models(
                state.registry.provider(),
                state.registry.healthy(),
                state.registry.models(),
                state.registry.current_selection(),
            );
            Ok(())
        }
        Some(Commands::Sessions) => {
            let state = client.state().await;
            render::sessions(state.sessions.sessions(), state.sessions.current());
            Ok(())
        }
    }
}

async fn run_chat(
    client: ChatClient,
    model: Option<String>,
    session: Option<String>,
    system_prompt: Option<String>,
) -> Result<()> {
    if let Some(name) = model {
        client.select_model(&name).await;
    }
    if let Some(id) = session {
        client.select_session(&id).await;
    }
    let repl = Repl::new(client, system_prompt);
    repl.run().await
}
