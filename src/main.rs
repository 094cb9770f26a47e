use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use coach_live::{
    ApiClient, Config, InterviewSession, SessionConfig, SessionMode, Speaker,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "coach-live", about = "Live voice/text client for interview practice")]
struct Cli {
    /// Path to the configuration file (TOML, optional)
    #[arg(long, default_value = "config/coach-live")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a live interview session from the terminal
    Session {
        /// Requested session mode (audio falls back to text without a mic)
        #[arg(long, value_enum, default_value_t = ModeArg::Audio)]
        mode: ModeArg,
    },
    /// Show the report for the most recent completed interview
    Report,
    /// Show the score trend across past interviews
    Trend,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Audio,
    Text,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Audio => SessionMode::Audio,
            ModeArg::Text => SessionMode::Text,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} starting", cfg.service.name);

    match cli.command {
        Command::Session { mode } => run_session(&cfg, mode.into()).await,
        Command::Report => show_report(&cfg).await,
        Command::Trend => show_trend(&cfg).await,
    }
}

async fn run_session(cfg: &Config, mode: SessionMode) -> Result<()> {
    let session = Arc::new(InterviewSession::new(SessionConfig::from_config(cfg)));

    let mut entries = session.subscribe_transcript().await;
    let printer = tokio::spawn(async move {
        while let Some(entry) = entries.recv().await {
            let label = match entry.speaker {
                Speaker::System => "system",
                Speaker::Agent => "interviewer",
                Speaker::Candidate => "you",
            };
            println!("[{}] {}", label, entry.text);
        }
    });

    session.connect(mode).await?;

    println!("Type your answers and press Enter. /quit ends the session.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "/quit" => break,
                    Some(line) => session.send_text(&line).await?,
                    None => break,
                }
            }
        }
    }

    session.disconnect().await?;
    printer.abort();

    let stats = session.stats().await;
    info!(
        "Session finished: {:.1}s, {} frames sent, {} frames played, {} transcript lines",
        stats.duration_secs, stats.frames_sent, stats.frames_played, stats.transcript_len
    );

    Ok(())
}

async fn show_report(cfg: &Config) -> Result<()> {
    let client = api_client(cfg)?;

    match client.latest_report().await? {
        Some(report) => {
            println!("Overall score:    {:.0}", report.overall_score);
            println!("Communication:    {:.0}", report.communication);
            println!("Technical depth:  {:.0}", report.technical_depth);
            println!("STAR method:      {:.0}", report.star_method);
            println!();
            println!("{}", report.feedback);
        }
        None => println!("No completed interviews yet."),
    }

    Ok(())
}

async fn show_trend(cfg: &Config) -> Result<()> {
    let client = api_client(cfg)?;

    let points = client.score_trend().await?;
    if points.is_empty() {
        println!("No completed interviews yet.");
        return Ok(());
    }

    for point in points {
        println!("{}  {:.0}", point.date, point.score);
    }

    Ok(())
}

fn api_client(cfg: &Config) -> Result<ApiClient> {
    let token = cfg
        .api
        .token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("api.token must be configured for report commands"))?;

    Ok(ApiClient::new(&cfg.api.base_url, token))
}
