//! Wiring between the session and its collaborators, plus the interactive
//! review loop.

use anyhow::{Context, Result};
use slidegen_core::{
    CompletionClient, DeckExporter, DocumentLoader, Error, ExportOutcome, FileSelection,
    OutlineFormatter, Phase, PresentationWriter, Session, SlideGenerator, SourceFile, Submission,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Owns every collaborator a session talks to.
pub struct App<C, W> {
    loader: Arc<DocumentLoader>,
    generator: SlideGenerator<C>,
    exporter: DeckExporter<W>,
    formatter: OutlineFormatter,
    output_dir: PathBuf,
}

impl<C: CompletionClient, W: PresentationWriter> App<C, W> {
    pub fn new(
        loader: DocumentLoader,
        generator: SlideGenerator<C>,
        exporter: DeckExporter<W>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            loader: Arc::new(loader),
            generator,
            exporter,
            formatter: OutlineFormatter::new(),
            output_dir,
        }
    }

    pub fn formatter(&self) -> &OutlineFormatter {
        &self.formatter
    }

    /// Read and parse a file off the async runtime, then apply the result.
    pub async fn load_file(&self, session: &mut Session, path: &Path) -> FileSelection {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if !session.begin_file_selection(&name) {
            return FileSelection::Ignored;
        }
        log::debug!("Loading {}", path.display());

        let loader = Arc::clone(&self.loader);
        let path = path.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || {
            let file = SourceFile::open(&path)?;
            loader.load(&file)
        })
        .await
        .unwrap_or_else(|e| Err(Error::DocumentParse(format!("Parser task failed: {}", e))));

        session.finish_file_selection(outcome)
    }

    /// Generate from the session's current source text.
    pub async fn generate(&self, session: &mut Session) -> Submission {
        let text = session.source_text().to_string();
        session.submit_text(&text, &self.generator).await
    }

    /// Save the current deck into the output directory.
    pub fn download(&self, session: &Session) -> Result<ExportOutcome> {
        if session.deck().is_some() {
            std::fs::create_dir_all(&self.output_dir).with_context(|| {
                format!("Failed to create output directory: {}", self.output_dir.display())
            })?;
        }
        Ok(session.export_current_deck(&self.exporter, &self.output_dir))
    }

    /// Run the review loop until `q` or end of input.
    pub async fn review<R, O>(&self, session: &mut Session, input: R, out: &mut O) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        O: Write,
    {
        writeln!(out, "{}", HELP)?;
        self.render(session, out)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read command")? {
            let Some(command) = ReviewCommand::parse(&line) else {
                continue;
            };
            if self.apply(session, command, out).await? == Flow::Quit {
                break;
            }
        }

        Ok(())
    }

    async fn apply<O: Write>(
        &self,
        session: &mut Session,
        command: ReviewCommand,
        out: &mut O,
    ) -> Result<Flow> {
        match command {
            ReviewCommand::Next => {
                session.next_slide();
                self.render(session, out)?;
            }
            ReviewCommand::Prev => {
                session.prev_slide();
                self.render(session, out)?;
            }
            ReviewCommand::Download => match self.download(session)? {
                ExportOutcome::Saved(path) => writeln!(out, "Saved {}", path.display())?,
                ExportOutcome::Failed(alert) => writeln!(out, "{}", alert)?,
                ExportOutcome::Skipped => writeln!(out, "Nothing to download yet.")?,
            },
            ReviewCommand::Regenerate => {
                writeln!(out, "Generating slides...")?;
                self.generate(session).await;
                self.render(session, out)?;
            }
            ReviewCommand::File(path) => match self.load_file(session, &path).await {
                FileSelection::Loaded => writeln!(
                    out,
                    "Loaded {} ({} chars). Press r to generate.",
                    path.display(),
                    session.source_text().chars().count()
                )?,
                FileSelection::Failed(alert) => writeln!(out, "{}", alert)?,
                FileSelection::Ignored => writeln!(out, "Busy; try again.")?,
            },
            ReviewCommand::Text(text) => {
                session.set_source_text(text);
                writeln!(
                    out,
                    "Text set ({} chars). Press r to generate.",
                    session.source_text().chars().count()
                )?;
            }
            ReviewCommand::Help => writeln!(out, "{}", HELP)?,
            ReviewCommand::Unknown(input) => writeln!(out, "Unknown command '{}'. {}", input, HELP)?,
            ReviewCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Print whatever the session currently shows.
    pub fn render<O: Write>(&self, session: &Session, out: &mut O) -> Result<()> {
        match session.phase() {
            Phase::Idle => writeln!(out, "No slides yet.")?,
            Phase::ParsingDocument => writeln!(out, "Parsing document...")?,
            Phase::GeneratingDeck => writeln!(out, "Generating slides...")?,
            Phase::Error => {
                writeln!(out, "{}", session.error_message().unwrap_or_default())?;
            }
            Phase::Ready => {
                if let (Some(deck), Some(slide)) = (session.deck(), session.current_slide()) {
                    let block = self.formatter.format_slide(
                        slide,
                        session.current_index(),
                        deck.slide_count(),
                    );
                    writeln!(out, "{}", block)?;
                }
            }
        }
        Ok(())
    }
}

const HELP: &str =
    "Commands: n next, p previous, d download, r regenerate, f PATH load file, t TEXT set text, q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// One line of review input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Next,
    Prev,
    Download,
    Regenerate,
    File(PathBuf),
    Text(String),
    Help,
    Quit,
    Unknown(String),
}

impl ReviewCommand {
    /// Parse a line; blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        Some(match (word, rest) {
            ("n" | "next", "") => Self::Next,
            ("p" | "prev", "") => Self::Prev,
            ("d" | "download", "") => Self::Download,
            ("r" | "regenerate", "") => Self::Regenerate,
            ("f" | "file", path) if !path.is_empty() => Self::File(PathBuf::from(path)),
            ("t" | "text", text) if !text.is_empty() => Self::Text(text.to_string()),
            ("h" | "help" | "?", "") => Self::Help,
            ("q" | "quit", "") => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}
