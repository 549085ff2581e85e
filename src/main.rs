use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scribewatch::cli::{Cli, Commands};
use scribewatch::config::Config;
use scribewatch::observer::{CancellationToken, JobObserver, ScriptedBoard};
use scribewatch::pipeline::plan_steps;
use scribewatch::report::JobReport;
use scribewatch::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Report { path, format } => {
            let report = JobReport::load(&path)
                .with_context(|| format!("Failed to load report {}", path.display()))?;
            output::print_to_console(&report, &format)?;
        }
        Commands::Replay {
            rows,
            id,
            output: output_dir,
            source,
            interval,
            settle_delay,
            max_wait,
            job,
        } => {
            let config = Config::load().await?;
            let options = job.to_options()?;

            let mut policy = config.poll_policy();
            if let Some(secs) = interval {
                policy.interval = std::time::Duration::from_secs(secs);
            }
            if let Some(secs) = settle_delay {
                policy.settle_delay = std::time::Duration::from_secs(secs);
            }
            if let Some(secs) = max_wait {
                policy.max_wait = Some(std::time::Duration::from_secs(secs));
            }
            policy.validate()?;

            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.join(&id));
            let mut board = ScriptedBoard::from_file(&rows)?;

            let mut report = JobReport::new(id, options);
            report.mark_started();
            if let Some(source) = source {
                report.set_source(source);
            }

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, stopping the observer");
                    ctrl_c.cancel();
                }
            });

            let observer = JobObserver::new(policy)
                .with_cancel_token(cancel)
                .with_progress(!cli.quiet);
            let outcome = observer.observe(&mut board, &mut report).await;
            if let Some(link) = board.navigations().last() {
                tracing::info!("Now at {}", link);
            }

            report.finalize();
            let path = report.save(&output_dir)?;
            println!("Report saved to: {}", path.display());

            if !outcome.is_success() {
                eprintln!("Job did not succeed: {:?}", outcome);
                std::process::exit(1);
            }
        }
        Commands::Plan { input, job } => {
            let source = input.media_source()?;
            let options = job.options_for(&source)?;
            let steps = plan_steps(&source, options.as_ref())?;

            println!("Source: {}", source.descriptor());
            for (index, step) in steps.iter().enumerate() {
                match step.output_kind() {
                    Some(kind) => println!("  {:>2}. {} -> {}", index + 1, step, kind),
                    None => println!("  {:>2}. {}", index + 1, step),
                }
            }
        }
        Commands::Languages => {
            for (code, name) in utils::LANGUAGES {
                println!("  {:<8} {}", code, name);
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "scribewatch=debug".into()
        } else {
            "scribewatch=info".into()
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
