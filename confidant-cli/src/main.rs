//! Confidant CLI - interactive terminal chat with the companion

mod interrupt;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use confidant_core::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;

use crate::interrupt::Interrupt;

#[derive(Parser)]
#[command(name = "confidant")]
#[command(about = "Talk with the Confidant companion", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Your name; used to find memories from earlier sessions
        #[arg(short, long)]
        name: Option<String>,

        /// Do not read or write long-term memory
        #[arg(long)]
        no_memory: bool,

        /// Explicit config file
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Version information
    Version,
}

type InputLines = Lines<BufReader<Stdin>>;

/// How a prompt ended
enum Input {
    Line(String),
    Closed,
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default so logs do not interleave with the conversation
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("confidant {}", env!("CARGO_PKG_VERSION"));
            println!("confidant-core {}", confidant_core::VERSION);
        }
        Commands::Chat {
            name,
            no_memory,
            config,
        } => {
            let mut config =
                ConfidantConfig::load(config.as_deref()).context("Failed to load configuration")?;
            if no_memory {
                config.memory.enabled = false;
            }
            run_chat(config, name).await?;

            // The blocking stdin reader may still be parked on a read, which
            // would hold runtime shutdown until the next Enter.
            std::process::exit(0);
        }
    }

    Ok(())
}

async fn run_chat(config: ConfidantConfig, name: Option<String>) -> Result<()> {
    let persona = resolve_persona(&config.persona).context("Failed to load persona")?;
    let provider = LLMProviderFactory::create(&config.llm);
    let memory = adapter_from_config(&config.memory).context("Failed to set up memory")?;
    let companion = config.persona.name.clone();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interrupt = Interrupt::install();

    println!("Welcome. I'm {companion}, and I'm here to listen.");

    let Some(owner) = resolve_name(name, &mut lines, &mut interrupt).await? else {
        farewell(&companion, None);
        return Ok(());
    };

    let start = ConversationSession::start(owner.as_str(), &persona, provider, memory);
    let Some(session) = interrupt.guard(start).await else {
        farewell(&companion, Some(&owner));
        return Ok(());
    };
    let mut session = session.with_settings(GenerationSettings::from(&config.llm));

    if !session.memory_enabled() && config.memory.enabled {
        println!("(Memory is unavailable right now; this conversation will not be remembered.)");
    }
    println!("Nice to meet you, {owner}. Type 'quit' or 'exit' to leave.\n");

    let mut pending: Vec<JoinHandle<SaveOutcome>> = Vec::new();
    let mut interrupted = false;

    loop {
        let line = match read_input("You: ", &mut lines, &mut interrupt).await? {
            Input::Line(line) => line,
            Input::Closed => break,
            Input::Interrupted => {
                interrupted = true;
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }

        let Some(result) = interrupt.guard(session.respond(text)).await else {
            interrupted = true;
            break;
        };

        match result {
            Ok(reply) => {
                println!("\n{companion}: {}\n", reply.response);
                pending.retain(|handle| !handle.is_finished());
                pending.extend(reply.persisted);
            }
            Err(e) if e.is_validation() => continue,
            Err(e) => return Err(e.into()),
        }
    }

    farewell(&companion, Some(&owner));

    if interrupted {
        if !pending.is_empty() {
            tracing::warn!(count = pending.len(), "Interrupted, abandoning pending memory saves");
        }
        return Ok(());
    }

    if interrupt.guard(drain_saves(pending)).await.is_none() {
        tracing::warn!("Interrupted while saving memories");
    }

    Ok(())
}

async fn drain_saves(pending: Vec<JoinHandle<SaveOutcome>>) {
    for handle in pending {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Memory save task did not complete");
        }
    }
}

/// Validate `--name` or prompt until an acceptable name is given
async fn resolve_name(
    name: Option<String>,
    lines: &mut InputLines,
    interrupt: &mut Interrupt,
) -> Result<Option<String>> {
    if let Some(name) = name {
        match validate_user_name(&name) {
            Ok(name) => return Ok(Some(name)),
            Err(e) => println!("{e}"),
        }
    }

    loop {
        match read_input("What should I call you? ", lines, interrupt).await? {
            Input::Line(line) => match validate_user_name(&line) {
                Ok(name) => return Ok(Some(name)),
                Err(e) => println!("{e}"),
            },
            Input::Closed | Input::Interrupted => return Ok(None),
        }
    }
}

/// Print a prompt and wait for one line, end of input, or Ctrl-C
async fn read_input(
    prompt: &str,
    lines: &mut InputLines,
    interrupt: &mut Interrupt,
) -> Result<Input> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    match interrupt.guard(lines.next_line()).await {
        Some(line) => Ok(match line? {
            Some(line) => Input::Line(line),
            None => Input::Closed,
        }),
        None => {
            println!();
            Ok(Input::Interrupted)
        }
    }
}

fn farewell(companion: &str, owner: Option<&str>) {
    match owner {
        Some(owner) => println!("\n{companion}: Take care, {owner}. I'll be here whenever you need me."),
        None => println!("\n{companion}: Take care. I'll be here whenever you need me."),
    }
}
