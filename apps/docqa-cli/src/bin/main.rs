use std::env;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docqa_core::chunker::load_document;
use docqa_core::config::Config;
use docqa_pipeline::{PipelineFacade, Session};

const USAGE: &str = "Usage: docqa [chat | ask \"<question>\" | chunks]";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return ("chat".to_string(), args);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

/// Logs go to stderr so answers on stdout stay pipeable. `RUST_LOG` overrides the default `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let (cmd, args) = parse_args();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let path = config.document_path(&settings);
    info!(env = config.env_name(), document = %path.display(), "starting");
    let document = load_document(&path).with_context(|| format!("Failed to read document {}", path.display()))?;
    let pipeline = PipelineFacade::from_settings(&settings)?;

    match cmd.as_str() {
        "chunks" => {
            let chunks = pipeline.preview_chunks(&document)?;
            for chunk in &chunks {
                println!("[{}] {}", chunk.id, chunk.text);
            }
            println!("{} chunks from {}", chunks.len(), path.display());
        }
        "ask" => {
            let question = args.join(" ");
            if question.trim().is_empty() {
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
            build(&pipeline, &document).await?;
            println!("{}", pipeline.answer(&question).await?);
        }
        "chat" => {
            build(&pipeline, &document).await?;
            chat_loop(&pipeline).await?;
        }
        _ => {
            eprintln!("Unknown command: {}\n{USAGE}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn build(pipeline: &PipelineFacade, document: &str) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message("Indexing document...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    match pipeline.build(document).await {
        Ok(_) => {
            spinner.finish_with_message(format!("✅ Ready ({} chunks indexed)", pipeline.index().len()));
            Ok(())
        }
        Err(e) => {
            spinner.abandon_with_message("❌ Indexing failed");
            Err(anyhow::Error::from(e).context("Failed to build the question-answering pipeline"))
        }
    }
}

async fn chat_loop(pipeline: &PipelineFacade) -> anyhow::Result<()> {
    let mut session = pipeline.new_session();
    show_help();

    loop {
        print!("pregunta> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/help" | "/h" => show_help(),
            "/topics" | "/t" => show_topics(&session),
            "/unanswered" | "/u" => show_unanswered(&session),
            "/history" => show_history(&session),
            "/quit" | "/q" | "quit" | "exit" => break,
            _ if input.starts_with("/sources") => {
                let question = input.trim_start_matches("/sources").trim();
                if question.is_empty() {
                    println!("Usage: /sources <question>");
                    continue;
                }
                match pipeline.sources(question).await {
                    Ok(hits) => {
                        for hit in hits {
                            println!("  {:.3}  [{}] {}", hit.score, hit.id, hit.text);
                        }
                    }
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    Err(e) => println!("❌ {e}"),
                }
            }
            _ if input.starts_with('/') => println!("Unknown command: {input} (try /help)"),
            question => {
                let answer = pipeline.answer_in(&mut session, question).await?;
                println!("\n{answer}\n");
            }
        }
    }
    println!("👋 Goodbye!");
    Ok(())
}

fn show_help() {
    println!("Commands:");
    println!("  /help           - Show this help message");
    println!("  /topics         - Questions per topic");
    println!("  /unanswered     - Questions the document could not answer");
    println!("  /history        - Conversation so far");
    println!("  /sources <q>    - Chunks retrieved for a question, with scores");
    println!("  /quit           - Exit");
    println!("  <question>      - Ask about the document");
    println!();
}

fn show_topics(session: &Session) {
    if session.total_mentions() == 0 {
        println!("No topics mentioned yet.");
        return;
    }
    for (topic, count) in session.topic_tally() {
        println!("  {:<12} {count:>3} {}", topic.as_str(), "#".repeat(*count));
    }
}

fn show_unanswered(session: &Session) {
    if session.unanswered().is_empty() {
        println!("Every question so far was answered.");
        return;
    }
    for question in session.unanswered() {
        println!("  - {question}");
    }
}

fn show_history(session: &Session) {
    for (i, turn) in session.history().iter().enumerate() {
        println!("{}. {}\n   {}", i + 1, turn.question, turn.answer);
    }
}
