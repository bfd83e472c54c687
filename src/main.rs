//! Wikisage entry point — CLI parsing, environment loading, and wiring.
//!
//! All real behavior lives in the workspace crates; this binary only
//! assembles them and drives the serve loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wikisage_agent::KnowledgePipeline;
use wikisage_channels::{ReplChannel, SessionRouter, TelegramChannel};
use wikisage_core::config::{SessionScope, WikisageConfig};
use wikisage_core::traits::Channel;
use wikisage_core::types::{OutgoingMessage, RetrievalQuery};
use wikisage_knowledge::{SectionIndex, WikiExtractor};
use wikisage_memory::FileHistoryStore;

#[derive(Parser)]
#[command(name = "wikisage", version, about = "Retrieval-augmented wiki question-answering bot")]
struct Cli {
    /// Path to a TOML config file. CLI flags override file values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the wiki, build the index, and start answering questions.
    Run(RunArgs),
    /// Run extraction only, print the sections, and exit.
    Docs(DocsArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Root URL of the wiki to extract.
    #[arg(long)]
    wiki_url: Option<String>,
    /// Path to the instruction prompt file.
    #[arg(long)]
    instruction_prompt: Option<String>,
    /// Path to the context prompt file (must contain `{context}`).
    #[arg(long)]
    context_prompt: Option<String>,
    /// Directory holding one history file per session.
    #[arg(long)]
    memory_dir: Option<String>,
    /// Chat model name.
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(long)]
    top_p: Option<f32>,
    /// Sections retrieved per query.
    #[arg(long)]
    retriever_k: Option<usize>,
    /// Keep a separate conversation history per user instead of one shared
    /// session.
    #[arg(long)]
    per_user_history: bool,
    /// Verbose tracing.
    #[arg(long)]
    debug: bool,
    /// Serve a local REPL instead of the Telegram channel.
    #[arg(long)]
    repl: bool,
}

#[derive(Args)]
struct DocsArgs {
    /// Root URL of the wiki to extract.
    #[arg(long)]
    wiki_url: Option<String>,
    /// Verbose tracing.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let debug = match &cli.command {
        Commands::Run(args) => args.debug,
        Commands::Docs(args) => args.debug,
    };
    init_tracing(debug);

    let mut config = match &cli.config {
        Some(path) => WikisageConfig::load_from(path)?,
        None => WikisageConfig::default(),
    };

    match cli.command {
        Commands::Run(args) => {
            apply_overrides(&mut config, &args);
            run(config, args.repl).await
        }
        Commands::Docs(args) => {
            if let Some(url) = args.wiki_url {
                config.wiki.url = url;
            }
            docs(config).await
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn apply_overrides(config: &mut WikisageConfig, args: &RunArgs) {
    if let Some(url) = &args.wiki_url {
        config.wiki.url = url.clone();
    }
    if let Some(path) = &args.instruction_prompt {
        config.prompts.instruction_file = path.clone();
    }
    if let Some(path) = &args.context_prompt {
        config.prompts.context_file = path.clone();
    }
    if let Some(dir) = &args.memory_dir {
        config.memory.dir = dir.clone();
    }
    if let Some(model) = &args.model {
        config.model.name = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.model.temperature = temperature;
    }
    if let Some(top_p) = args.top_p {
        config.model.top_p = top_p;
    }
    if let Some(k) = args.retriever_k {
        config.retrieval.k = k;
    }
    if args.per_user_history {
        config.memory.session_scope = SessionScope::PerUser;
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{name} environment variable is required"),
    }
}

fn read_prompt(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read prompt file {path}"))
}

async fn run(config: WikisageConfig, repl: bool) -> anyhow::Result<()> {
    let api_key = require_env("OPENAI_API_KEY")?;
    let bot_token = if repl {
        String::new()
    } else {
        require_env("TELEGRAM_BOT_TOKEN")?
    };

    let instruction_prompt = read_prompt(&config.prompts.instruction_file)?;
    let context_prompt = read_prompt(&config.prompts.context_file)?;
    if !context_prompt.contains("{context}") {
        bail!(
            "context prompt file {} has no {{context}} placeholder",
            config.prompts.context_file
        );
    }

    info!(wiki_url = %config.wiki.url, "extracting wiki sections");
    let extractor = WikiExtractor::new(&config.wiki.url)?;
    let sections = extractor.extract().await?;
    info!(sections = sections.len(), "extraction complete");

    let embedder = wikisage_providers::create_embedder(&config.model, &api_key)?;
    let index = SectionIndex::build(sections, embedder, config.retrieval.k).await?;
    info!(indexed = index.len(), k = config.retrieval.k, "section index ready");

    let completer = wikisage_providers::create_completer(&config.model, &api_key)?;
    let history = Arc::new(FileHistoryStore::new(&config.memory.dir)?);
    let pipeline = KnowledgePipeline::new(
        completer,
        Arc::new(index),
        history,
        &instruction_prompt,
        &context_prompt,
    );

    let (channel, mention_token): (Box<dyn Channel>, String) = if repl {
        let mut channel = ReplChannel::new();
        channel.connect().await?;
        (Box::new(channel), String::new())
    } else {
        let mut channel = TelegramChannel::new(bot_token, config.telegram.poll_interval);
        channel.connect().await?;
        let mention_token = channel.mention_token();
        (Box::new(channel), mention_token)
    };
    let router = SessionRouter::new(config.memory.session_scope, mention_token);

    serve(channel, router, pipeline).await
}

async fn serve(
    channel: Box<dyn Channel>,
    router: SessionRouter,
    pipeline: KnowledgePipeline,
) -> anyhow::Result<()> {
    let mut stream = channel.listen();
    info!("serving questions");

    while let Some(message) = stream.next().await {
        let Some(routed) = router.route(&message) else {
            continue;
        };

        let query = RetrievalQuery {
            text: routed.text,
            user_name: message
                .sender_name
                .clone()
                .unwrap_or_else(|| message.sender_id.clone()),
            session_id: routed.session_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match pipeline.answer(&query).await {
            Ok(answer) => {
                let reply = OutgoingMessage {
                    thread_id: message.thread_id.clone(),
                    content: answer,
                };
                if let Err(e) = channel.send(reply).await {
                    error!("failed to send reply: {e}");
                }
            }
            // A failed turn stays silent: no reply, no history entry.
            Err(e) => error!(session_id = %query.session_id, "turn failed: {e}"),
        }
    }
    Ok(())
}

async fn docs(config: WikisageConfig) -> anyhow::Result<()> {
    info!(wiki_url = %config.wiki.url, "extracting wiki sections");
    let extractor = WikiExtractor::new(&config.wiki.url)?;
    let sections = extractor.extract().await?;

    for section in &sections {
        let head: String = section.content.chars().take(300).collect();
        println!("Content:\n{head}");
        println!("-------------------");
        println!("Source: {}", section.source_url);
        println!("{}", "-------------------\n".repeat(3));
    }
    println!("Extracted {} sections", sections.len());
    Ok(())
}
