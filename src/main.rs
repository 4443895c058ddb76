use clap::{Parser, ValueEnum};
use miette::miette;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use sweep_config::Config;
use sweep_library::{Mode, Outcome, Pipeline};
use sweep_report::Renderer;
use sweep_report::sink::{OutboxSink, SendmailSink, SmtpSink};
use tracing_subscriber::EnvFilter;

/// Back up the download folder into two dated trees, then empty it.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// `auto` never prompts; `manual` asks before deleting anything.
    #[arg(value_enum, default_value_t = RunMode::Manual)]
    mode: RunMode,
    /// Configuration file (defaults to `sweep.toml` in the config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Increase verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RunMode {
    Auto,
    Manual,
}
impl From<RunMode> for Mode {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Auto => Mode::Auto,
            RunMode::Manual => Mode::Manual,
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).compact().init();
}

fn main() -> miette::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Captured once: every destination path and collision suffix of this run
    // derives from it.
    let now = sweep_library::now();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", *err);
            return Err(miette!("{err:?}"));
        },
    };

    let mut pipeline = Pipeline::from_config(&config, now).map_err(|err| miette!("{err:?}"))?;
    let renderer = Arc::new(Renderer::new().map_err(|err| miette!("{err:?}"))?);
    if let Some(outbox) = &config.report.outbox {
        pipeline = pipeline.with_sink(Box::new(OutboxSink::new(outbox, renderer.clone())));
    }
    if let Some(email) = &config.report.email {
        let sink = match &email.sendmail {
            Some(binary) => Ok(SendmailSink::new(binary, &email.from, &email.to, renderer.clone())),
            None => SendmailSink::discover(&email.from, &email.to, renderer.clone()),
        };
        match sink {
            Ok(sink) => pipeline = pipeline.with_sink(Box::new(sink)),
            Err(err) => tracing::warn!(error = %*err, "E-mail reports disabled"),
        }
    }
    if let Some(smtp) = &config.report.smtp {
        match SmtpSink::new(&smtp.server, smtp.port, &smtp.from, &smtp.to, renderer.clone()) {
            Ok(sink) => {
                let sink = match (&smtp.username, &smtp.password) {
                    (Some(username), Some(password)) => sink.with_credentials(username, password),
                    _ => sink,
                };
                pipeline = pipeline.with_sink(Box::new(sink));
            },
            Err(err) => tracing::warn!(error = %*err, "SMTP reports disabled"),
        }
    }

    let outcome = pipeline.run(cli.mode.into(), now, confirm);
    Ok(match outcome {
        Outcome::Completed(summary) => {
            if matches!(cli.mode, RunMode::Manual) {
                println!("\nDone: {} (+{:.2} MB)", summary.status_label(), summary.mb_freed());
            }
            ExitCode::SUCCESS
        },
        Outcome::Failed(_) | Outcome::Declined => ExitCode::FAILURE,
    })
}

/// Warns about the upcoming deletion and asks for an explicit `yes`.
fn confirm(source: &Path) -> bool {
    println!("WARNING: once the backup finishes, every file in {} WILL BE DELETED.", source.display());
    print!("Proceed with backup and deletion? [type 'yes' to continue]: ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("yes"),
        Err(_) => false,
    }
}
