//! Turn notes and documents into PowerPoint slide decks.

mod app;
mod config;

use anyhow::{bail, Context, Result};
use app::App;
use clap::{Args, Parser, Subcommand};
use config::GeminiArgs;
use slidegen_core::{
    DeckExporter, ExportOutcome, FileSelection, OutlineFormatter, Phase, Session, SlideGenerator,
    Submission,
};
use slidegen_gemini::GeminiClient;
use slidegen_pptx::{PptxReader, PptxWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Generate presentation slides from text with Gemini.
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck from a document, inline text or stdin
    Generate(GenerateArgs),
    /// Print the outline of a .pptx file
    Show {
        /// Presentation to read
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Source document (.txt, .md, .pdf or .docx)
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Source text; stdin is read when neither this nor --file is given
    #[arg(short, long)]
    text: Option<String>,

    /// Directory presentation.pptx is saved into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Print the slides to stdout instead of writing a file
    #[arg(short, long, conflicts_with = "markdown")]
    print: bool,

    /// Print the slides as Markdown instead of writing a file
    #[arg(short, long)]
    markdown: bool,

    /// Review slides one at a time before downloading
    #[arg(short, long, conflicts_with_all = ["print", "markdown"])]
    interactive: bool,

    #[command(flatten)]
    gemini: GeminiArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Show { input } => show(&input),
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let client = GeminiClient::new(args.gemini.to_config()?)?;
    log::debug!("Using model {}", client.config().model);

    let app = App::new(
        slidegen_loader::default_loader(),
        SlideGenerator::new(client),
        DeckExporter::new(PptxWriter::new()),
        args.output.clone(),
    );
    let mut session = Session::new();

    if let Some(path) = &args.file {
        match app.load_file(&mut session, path).await {
            FileSelection::Loaded => {
                log::debug!("Loaded {} chars from {}", session.source_text().len(), path.display())
            }
            FileSelection::Failed(alert) => bail!("{}", alert),
            FileSelection::Ignored => bail!("Another operation is still running"),
        }
    } else if let Some(text) = &args.text {
        session.set_source_text(text.as_str());
    } else if !args.interactive {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        session.set_source_text(text);
    }

    if args.interactive {
        if !session.source_text().trim().is_empty() {
            eprintln!("Generating slides...");
            app.generate(&mut session).await;
        }
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        return app.review(&mut session, stdin, &mut std::io::stdout()).await;
    }

    eprintln!("Generating slides...");
    if app.generate(&mut session).await == Submission::Ignored {
        bail!("Another operation is still running");
    }
    if session.phase() != Phase::Ready {
        bail!("{}", session.error_message().unwrap_or("Generation failed"));
    }
    let deck = session.deck().context("Generation finished without a deck")?;

    if args.print {
        println!("{}", app.formatter().format_deck(deck));
        return Ok(());
    }
    if args.markdown {
        print!("{}", app.formatter().to_markdown(deck));
        return Ok(());
    }

    match app.download(&session)? {
        ExportOutcome::Saved(path) => {
            println!("Saved {} slides to {}", deck.slide_count(), path.display());
            Ok(())
        }
        ExportOutcome::Failed(alert) => bail!("{}", alert),
        ExportOutcome::Skipped => bail!("Nothing to export"),
    }
}

fn show(input: &Path) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let deck = PptxReader::new()
        .read(BufReader::new(file))
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("{}", OutlineFormatter::new().format_deck(&deck));
    Ok(())
}
