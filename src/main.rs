use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use studypack::pipeline::sequencer::SequencerObserver;
use studypack::pipeline::{
    Difficulty, EnabledTasks, StudyRequest, StudyService, SummaryStyle, TaskOptions,
};
use studypack::{api, config, export, extract, logging, render};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "studypack",
    version,
    about = "Turn a PDF into section summaries, multiple-choice questions, and flashcards"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate study material for a PDF, print it, and write export files.
    Process(ProcessArgs),
    /// Print the section boundaries a PDF would be split into.
    Chunks {
        /// PDF document to inspect.
        pdf: PathBuf,
    },
    /// Start the HTTP API.
    Serve,
}

#[derive(Args)]
struct ProcessArgs {
    /// PDF document to study.
    pdf: PathBuf,
    /// Generate section summaries (on by default).
    #[arg(long, overrides_with = "no_summaries")]
    summaries: bool,
    /// Skip section summaries.
    #[arg(long, overrides_with = "summaries")]
    no_summaries: bool,
    /// Generate multiple-choice questions.
    #[arg(long)]
    quizzes: bool,
    /// Generate flashcards.
    #[arg(long)]
    flashcards: bool,
    #[arg(long, value_enum, default_value_t = SummaryStyle::Concise)]
    style: SummaryStyle,
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// Questions per section (4-12).
    #[arg(long, default_value_t = 6)]
    quiz_count: usize,
    /// Flashcards per section (4-12).
    #[arg(long, default_value_t = 8)]
    flashcard_count: usize,
    /// Directory receiving summaries.txt, quizzes.csv, and flashcards.csv.
    #[arg(long, default_value = "output")]
    out: PathBuf,
}

impl ProcessArgs {
    fn request(&self) -> StudyRequest {
        StudyRequest {
            tasks: EnabledTasks {
                summaries: !self.no_summaries,
                quizzes: self.quizzes,
                flashcards: self.flashcards,
            },
            options: TaskOptions {
                style: self.style,
                difficulty: self.difficulty,
                quiz_count: self.quiz_count,
                flashcard_count: self.flashcard_count,
            },
        }
    }
}

/// Prints section progress to stderr so stdout carries only the rendered material.
struct ProgressReporter;

impl SequencerObserver for ProgressReporter {
    fn section_started(&self, section: usize, total: usize) {
        eprintln!("[{section}/{total}] processing section {section}");
    }

    fn section_finished(&self, section: usize, failed_tasks: usize) {
        if failed_tasks > 0 {
            eprintln!("[{section}] {failed_tasks} task(s) failed");
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing();

    match cli.command {
        Command::Process(args) => process(args).await,
        Command::Chunks { pdf } => chunks(pdf).await,
        Command::Serve => serve().await,
    }
}

async fn process(args: ProcessArgs) -> Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    let service = StudyService::new(config)
        .context("failed to initialize Gemini client")?
        .with_observer(Arc::new(ProgressReporter));

    let run = service
        .process_path(&args.pdf, args.request())
        .await
        .with_context(|| format!("failed to process {}", args.pdf.display()))?;

    println!("{}", render::render_run(&run));

    let written = export::write_exports(&args.out, &run).context("failed to write exports")?;
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

async fn chunks(pdf: PathBuf) -> Result<()> {
    let params = config::chunking_from_env().context("invalid chunking configuration")?;
    let document = extract::extract_path(&pdf)
        .await
        .with_context(|| format!("failed to extract {}", pdf.display()))?;

    println!(
        "pages={} chars={} chunk_size={} overlap={} sections={}",
        document.page_count,
        document.char_count(),
        params.max_chars(),
        params.overlap(),
        params.expected_count(document.char_count())
    );
    println!("{:>7} {:>10} {:>8}", "section", "start", "length");
    for chunk in params.chunks(&document.text) {
        println!(
            "{:>7} {:>10} {:>8}",
            chunk.index,
            chunk.start,
            chunk.char_len()
        );
    }
    Ok(())
}

async fn serve() -> Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    let port = config.server_port;
    let service = StudyService::new(config).context("failed to initialize Gemini client")?;
    let app = api::create_router(Arc::new(service));

    let (listener, port) = bind_listener(port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}
