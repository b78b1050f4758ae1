mod cli;

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use circuitstats::server::{AppState, build_router, shutdown_signal};
use circuitstats::AppError;
use circuitstats_config::Config;
use circuitstats_core::StatsService;

use crate::cli::{Cli, Command, ServeArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config is needed before tracing to know the configured level, so
    // load failures are reported straight to stderr.
    let config = match circuitstats_config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => exit_with(AppError::from(err)),
    };

    init_tracing(cli.verbose, &config);

    if let Err(err) = run(cli, config).await {
        exit_with(err);
    }
}

fn exit_with(err: AppError) -> ! {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}

fn init_tracing(verbosity: u8, config: &Config) {
    let fallback = match verbosity {
        0 => config.log_filter(),
        1 => "debug".into(),
        _ => "trace".into(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    let service = StatsService::new(config.service_config()?)?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(service, &config, &args).await,
        Command::Check => check(&service).await,
    }
}

async fn serve(service: StatsService, config: &Config, args: &ServeArgs) -> Result<(), AppError> {
    let mut addr = config.listen_addr()?;
    if let Some(port) = args.port {
        addr.set_port(port);
    }
    if let Some(ip) = args.bind {
        addr.set_ip(ip);
    }

    let app = build_router(AppState::new(service));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;

    info!(%addr, "circuitstats dashboard listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)
}

async fn check(service: &StatsService) -> Result<(), AppError> {
    let org = service.organization().await?;
    let sites = service.sites().await?;
    println!("Mist API:     {}", service.client().base_url());
    println!("Organization: {} ({})", org.name, org.id);
    println!("Sites:        {}", sites.len());
    Ok(())
}
