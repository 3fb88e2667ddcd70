//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::console_report::{JsonReport, TextReport};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::polygon_adapter::{API_KEY_ENV, PolygonAdapter, PolygonConfig};
use crate::domain::assessment::{AssessmentSettings, DEFAULT_LOOKBACK_DAYS, RiskReport, assess};
use crate::domain::config_validation::{SOURCE_CSV, validate_config};
use crate::domain::error::{ErrorKind, GoldenStopError};
use crate::domain::request::RiskRequest;
use crate::domain::risk::{DEFAULT_ATR_PERIOD, GOLDEN_RATIO_MULTIPLIER, RiskParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(
    name = "goldenstop",
    about = "ATR-based stop loss and take profit levels using the golden ratio"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute stop loss and take profit for one position
    Check {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, allow_hyphen_values = true)]
        average_price: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Read bars from <DIR>/<SYMBOL>.csv instead of the configured source
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the web form server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
}

#[derive(Debug, Clone)]
pub enum DataSourceSettings {
    Polygon(PolygonConfig),
    Csv(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: DataSourceSettings,
    pub assessment: AssessmentSettings,
    pub listen: SocketAddr,
}

pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Check {
            symbol,
            average_price,
            config,
            csv_dir,
            as_of,
            json,
        } => run_check(
            &symbol,
            &average_price,
            config.as_ref(),
            csv_dir,
            as_of,
            json,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Serve { config, listen } => run_serve(config.as_ref(), listen),
    }
}

/// Message for the terminal: operator-facing errors keep their detail.
fn report_error(err: &GoldenStopError) -> ExitCode {
    match err.kind() {
        ErrorKind::Config | ErrorKind::Io => eprintln!("error: {err}"),
        _ => {
            tracing::debug!(error = %err, "request failed");
            eprintln!("error: {}", err.user_message());
        }
    }
    err.into()
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, GoldenStopError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| GoldenStopError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Assembles typed settings. `env_api_key` is consulted only when the config
/// has no `[polygon] api_key`.
pub fn build_settings(
    config: &dyn ConfigPort,
    env_api_key: Option<String>,
) -> Result<Settings, GoldenStopError> {
    validate_config(config)?;

    let source = match config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        Some(SOURCE_CSV) => {
            // validate_config guarantees csv_dir is present
            let dir = config.get_string("data", "csv_dir").unwrap_or_default();
            DataSourceSettings::Csv(PathBuf::from(dir))
        }
        _ => {
            let defaults = PolygonConfig::default();
            DataSourceSettings::Polygon(PolygonConfig {
                base_url: config
                    .get_string("polygon", "base_url")
                    .unwrap_or(defaults.base_url),
                api_key: config.get_string("polygon", "api_key").or(env_api_key),
                timeout: Duration::from_secs(
                    config.get_int("polygon", "timeout_secs", defaults.timeout.as_secs() as i64)
                        as u64,
                ),
                max_retries: config.get_int(
                    "polygon",
                    "max_retries",
                    i64::from(defaults.max_retries),
                ) as u32,
                base_delay: defaults.base_delay,
            })
        }
    };

    let assessment = AssessmentSettings {
        lookback_days: config.get_int("data", "lookback_days", i64::from(DEFAULT_LOOKBACK_DAYS))
            as u32,
        params: RiskParams {
            atr_period: config.get_int("risk", "atr_period", DEFAULT_ATR_PERIOD as i64) as usize,
            multiplier: config.get_double("risk", "multiplier", GOLDEN_RATIO_MULTIPLIER),
        },
    };

    let listen = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string())
        .parse()
        .map_err(|_| GoldenStopError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: "listen must be host:port".into(),
        })?;

    Ok(Settings {
        source,
        assessment,
        listen,
    })
}

pub fn build_data_port(
    source: &DataSourceSettings,
) -> Result<Arc<dyn DataPort + Send + Sync>, GoldenStopError> {
    match source {
        DataSourceSettings::Polygon(config) => {
            tracing::info!(base_url = %config.base_url, "using polygon data source");
            Ok(Arc::new(PolygonAdapter::new(config.clone())?))
        }
        DataSourceSettings::Csv(dir) => {
            tracing::info!(dir = %dir.display(), "using csv data source");
            Ok(Arc::new(CsvAdapter::new(dir.clone())))
        }
    }
}

/// Fetch, compute, and write one report.
pub fn run_check_pipeline(
    data_port: &dyn DataPort,
    request: &RiskRequest,
    as_of: NaiveDate,
    settings: &AssessmentSettings,
    reporter: &dyn ReportPort,
    out: &mut dyn Write,
) -> Result<RiskReport, GoldenStopError> {
    let report = assess(data_port, request, as_of, settings)?;
    reporter.write(&report, out)?;
    Ok(report)
}

fn run_check(
    symbol: &str,
    average_price: &str,
    config_path: Option<&PathBuf>,
    csv_dir: Option<PathBuf>,
    as_of: Option<NaiveDate>,
    json: bool,
) -> ExitCode {
    let request = match RiskRequest::parse(symbol, average_price) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    let mut settings = match build_settings(&config, std::env::var(API_KEY_ENV).ok()) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };
    if let Some(dir) = csv_dir {
        settings.source = DataSourceSettings::Csv(dir);
    }

    let data_port = match build_data_port(&settings.source) {
        Ok(p) => p,
        Err(e) => return report_error(&e),
    };

    let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
    let reporter: &dyn ReportPort = if json {
        &JsonReport as &dyn ReportPort
    } else {
        &TextReport
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run_check_pipeline(
        data_port.as_ref(),
        &request,
        as_of,
        &settings.assessment,
        reporter,
        &mut out,
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(Some(config_path)) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    let settings = match build_settings(&config, std::env::var(API_KEY_ENV).ok()) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    match &settings.source {
        DataSourceSettings::Polygon(p) => {
            eprintln!("  source:        polygon ({})", p.base_url);
            if p.api_key.is_none() {
                eprintln!("  warning: no API key in config or {API_KEY_ENV}");
            }
        }
        DataSourceSettings::Csv(dir) => eprintln!("  source:        csv ({})", dir.display()),
    }
    eprintln!("  lookback_days: {}", settings.assessment.lookback_days);
    eprintln!("  atr_period:    {}", settings.assessment.params.atr_period);
    eprintln!("  multiplier:    {}", settings.assessment.params.multiplier);
    eprintln!("  listen:        {}", settings.listen);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_serve(config_path: Option<&PathBuf>, listen: Option<SocketAddr>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return report_error(&e),
        };
        let settings = match build_settings(&config, std::env::var(API_KEY_ENV).ok()) {
            Ok(s) => s,
            Err(e) => return report_error(&e),
        };
        let data_port = match build_data_port(&settings.source) {
            Ok(p) => p,
            Err(e) => return report_error(&e),
        };

        let addr = listen.unwrap_or(settings.listen);
        // The blocking HTTP client must not be dropped inside the runtime.
        let _data_port_guard = Arc::clone(&data_port);
        let router = build_router(AppState {
            data_port,
            settings: settings.assessment,
            as_of: None,
        });

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return report_error(&GoldenStopError::Io(e)),
        };

        let served: std::io::Result<()> = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "web server listening");
            eprintln!("Serving on http://{addr}");
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report_error(&GoldenStopError::Io(e)),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, listen);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
