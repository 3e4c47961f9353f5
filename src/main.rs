use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use policy_gap_analyzer::app::{self, AnalysisRequest};
use policy_gap_analyzer::config::{Config, LoggingConfig};
use policy_gap_analyzer::report::ReportFormat;
use policy_gap_analyzer::scoring::ComplianceScorer;
use policy_gap_analyzer::Error;

/// Compare a security policy against a reference framework with a local model
#[derive(Debug, Parser)]
#[command(name = "policy-gap", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "GAP_CONFIG")]
    config: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run gap analysis, scoring and remediation, then write reports
    Analyze {
        /// Organization policy document (.pdf, .txt, .md)
        #[arg(long)]
        policy: String,

        /// Reference framework document
        #[arg(long)]
        reference: String,

        /// Override the model identifier
        #[arg(long)]
        model: Option<String>,

        /// Override the reference framework name
        #[arg(long)]
        framework: Option<String>,

        /// Override the output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = FormatArg::All)]
        format: FormatArg,

        /// Stop after scoring
        #[arg(long)]
        skip_remediation: bool,
    },

    /// Verify the model runtime is reachable and the model is installed
    Check,

    /// Score an existing gap analysis file without calling a model
    Score {
        file: String,

        /// Print the score and summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Json,
    Summary,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ReportFormat> {
        match self {
            Self::Markdown => vec![ReportFormat::Markdown],
            Self::Json => vec![ReportFormat::Json],
            Self::Summary => vec![ReportFormat::SummaryOnly],
            Self::All => ReportFormat::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let result = run(cli.command, config).await;
    if cli.metrics {
        print!("{}", app::metrics_snapshot());
    }
    if let Err(ref e) = result {
        if let Some(hint) = e.downcast_ref::<Error>().and_then(Error::hint) {
            eprintln!("hint: {}", hint);
        }
    }
    result
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Command, mut config: Config) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            policy,
            reference,
            model,
            framework,
            output_dir,
            format,
            skip_remediation,
        } => {
            if let Some(model) = model {
                config.inference.model = model;
            }
            if let Some(framework) = framework {
                config.framework_name = framework;
            }
            if let Some(dir) = output_dir {
                config.output.output_dir = dir;
            }

            let request = AnalysisRequest {
                policy,
                reference,
                include_remediation: !skip_remediation,
                formats: format.formats(),
            };

            let outcome = app::run_analysis(&config, &request)
                .await
                .context("Policy gap analysis failed")?;

            println!("{}", ComplianceScorer::display(&outcome.bundle.score));
            println!("{}", outcome.bundle.summary.overall_assessment);
            for path in &outcome.reports {
                println!("Report written: {}", path.display());
            }
        }

        Command::Check => {
            let status = app::check_runtime(&config)
                .await
                .with_context(|| format!("Model runtime at {} is not usable", config.inference.base_url))?;

            println!("Runtime: {} (reachable)", config.inference.base_url);
            println!("Installed models: {}", status.installed_models.join(", "));
            if !status.model_available {
                bail!(
                    "Model '{}' is not installed; run 'ollama pull {}'",
                    status.model,
                    status.model
                );
            }
            println!("Model '{}' is available", status.model);
        }

        Command::Score { file, json } => {
            let (record, summary) = app::score_file(&config, &file)
                .await
                .with_context(|| format!("Failed to score {}", file))?;

            if json {
                let value = serde_json::json!({ "score": record, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", ComplianceScorer::display(&record));
                println!("{}", summary.overall_assessment);
                for recommendation in &summary.priority_recommendations {
                    println!("  - {}", recommendation);
                }
            }
        }
    }

    Ok(())
}
