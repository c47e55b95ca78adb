use anyhow::{anyhow, Context, Result};
use app::Stages;
use application::{ApiResponse, ApplicationResult};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use common::{init_structured_logging, AppConfig, LoggingConfig};
use domain::{GenerationOutcome, PatentRecord};
use llm::CancellationToken;
use progress::ProgressType;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{info, warn, Level};

mod app;
mod output;
mod progress;

#[derive(Parser, Debug)]
#[command(name = "patentscope")]
#[command(about = "Prior-art search and patentability analysis for invention ideas")]
#[command(version)]
struct Cli {
    /// TOML-файл конфигурации
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Логи в JSON (stderr)
    #[arg(long, global = true)]
    json_logs: bool,

    /// Подробнее логи: -v info, -vv debug
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// [●] Найти похожие патенты
    Search {
        /// Описание идеи
        idea: String,
        /// Сколько патентов вернуть
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
    },
    /// [◆] Анализ идеи по заранее найденным патентам
    Suggest {
        /// Описание идеи
        idea: String,
        /// JSON с кандидатами: массив патентов или ответ `api search`
        #[arg(long, value_name = "FILE")]
        candidates: PathBuf,
    },
    /// [►] Поиск и анализ за один запуск
    Analyze {
        idea: String,
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
    },
    /// [○] JSON API: тело запроса из stdin, ответ в stdout
    Api {
        #[arg(value_enum)]
        endpoint: Endpoint,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    Search,
    Suggest,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Search => application::SEARCH_PATH,
            Endpoint::Suggest => application::SUGGEST_PATH,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            return ExitCode::from(1);
        }
    };

    if let Err(e) = init_structured_logging(logging_config(&cli, &config)) {
        output::print_error(&format!("Failed to initialise logging: {e}"));
    }

    let token = CancellationToken::new();
    spawn_ctrl_c_handler(token.clone());

    let result = match cli.command {
        Commands::Search { idea, top_k } => run_search(&config, &idea, top_k).await,
        Commands::Suggest { idea, candidates } => {
            run_suggest(&config, &idea, &candidates, &token).await
        }
        Commands::Analyze { idea, top_k } => run_analyze(&config, &idea, top_k, &token).await,
        Commands::Api { endpoint } => run_api(&config, endpoint, &token).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}

fn logging_config(cli: &Cli, config: &AppConfig) -> LoggingConfig {
    let level = match cli.verbose {
        0 => config.logging.level.parse().unwrap_or(Level::WARN),
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    LoggingConfig::default()
        .with_level(level)
        .with_json_output(cli.json_logs || config.logging.json)
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight work");
            token.cancel();
        }
    });
}

async fn run_search(config: &AppConfig, idea: &str, top_k: Option<usize>) -> Result<ExitCode> {
    let service = app::build_service(config, Stages::Search).await?;
    let k = top_k.unwrap_or(config.retrieval.top_k);

    let found = service.find_similar(idea, k).await?;
    output::print_candidates(&found);
    Ok(ExitCode::SUCCESS)
}

async fn run_suggest(
    config: &AppConfig,
    idea: &str,
    candidates: &Path,
    token: &CancellationToken,
) -> Result<ExitCode> {
    let records = load_candidates(candidates)?;
    let service = app::build_service(config, Stages::Suggest).await?;
    info!(candidates = records.len(), "Loaded candidates");

    let outcome = generate(service.analyze_with_cancellation(idea, &records, token)).await?;
    Ok(report_outcome(outcome))
}

async fn run_analyze(
    config: &AppConfig,
    idea: &str,
    top_k: Option<usize>,
    token: &CancellationToken,
) -> Result<ExitCode> {
    let service = app::build_service(config, Stages::Both).await?;
    let k = top_k.unwrap_or(config.retrieval.top_k);

    let spinner = ProgressType::Search.spinner("Searching similar patents...");
    let found = service.find_similar(idea, k).await;
    spinner.finish_and_clear();
    let found = found?;
    output::print_candidates(&found);

    if found.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let records = found.records();
    let outcome = generate(service.analyze_with_cancellation(idea, &records, token)).await?;
    Ok(report_outcome(outcome))
}

/// Генерация под спиннером; ожидание между попытками тоже под ним
async fn generate<F>(analysis: F) -> Result<GenerationOutcome>
where
    F: Future<Output = ApplicationResult<GenerationOutcome>>,
{
    let spinner = ProgressType::Generation.spinner("Generating analysis...");
    let outcome = analysis.await;
    match &outcome {
        Ok(GenerationOutcome::Success { .. }) => spinner.finish_success("Analysis ready"),
        Ok(GenerationOutcome::Failure { kind, .. }) => spinner.finish_error(kind.as_str()),
        Err(_) => spinner.finish_and_clear(),
    }
    Ok(outcome?)
}

fn report_outcome(outcome: GenerationOutcome) -> ExitCode {
    match outcome {
        GenerationOutcome::Success { text } => {
            output::print_analysis(&text);
            ExitCode::SUCCESS
        }
        GenerationOutcome::Failure { message, .. } => {
            output::print_error(&message);
            ExitCode::from(2)
        }
    }
}

/// `api <endpoint>`: одно тело запроса из stdin, ответ JSON в stdout
async fn run_api(
    config: &AppConfig,
    endpoint: Endpoint,
    token: &CancellationToken,
) -> Result<ExitCode> {
    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("Failed to read request body from stdin")?;

    let stages = match endpoint {
        Endpoint::Search => Stages::Search,
        Endpoint::Suggest => Stages::Suggest,
    };
    let response = match app::build_handlers(config, stages).await {
        Ok(handlers) => handlers.route(endpoint.path(), &body, token).await,
        Err(e) => ApiResponse {
            status: 500,
            body: serde_json::json!({ "error": format!("{e:#}") }),
        },
    };

    println!("{}", response.body);
    Ok(ExitCode::from(exit_code_for_status(response.status)))
}

fn exit_code_for_status(status: u16) -> u8 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Кандидаты для `suggest`: массив патентов или объект с `similar_patents`
fn load_candidates(path: &Path) -> Result<Vec<PatentRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file {}", path.display()))?;
    parse_candidates(&content)
        .with_context(|| format!("Invalid candidates file {}", path.display()))
}

fn parse_candidates(content: &str) -> Result<Vec<PatentRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let list = match value {
        Value::Object(mut object) => object
            .remove("similar_patents")
            .ok_or_else(|| anyhow!("expected an array or an object with `similar_patents`"))?,
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}
