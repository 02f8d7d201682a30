use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use subpanel::generator::config::ruleset::rules_version;
use subpanel::interfaces::{subscribe, SubscribeRequest};
use subpanel::models::AppState;
use subpanel::store::FileStore;
use subpanel::web_handlers::interfaces;
use subpanel::Settings;

/// Subscription endpoint for proxy panels
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "subpanel.toml")]
    config: String,

    /// Path to the user/node data file, overrides `data_path`
    #[arg(short, long, value_name = "FILE")]
    data: Option<String>,

    /// Listen address (e.g., 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Listen port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Render the subscription of this token instead of starting the server
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Target format for --token
    #[arg(long, value_name = "TARGET")]
    target: Option<String>,

    /// Output file path for --token
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<String>,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn render_to_file(
    state: &AppState,
    token: &str,
    target: Option<&str>,
    output: &str,
) -> anyhow::Result<()> {
    let request = SubscribeRequest {
        token,
        target,
        now: unix_now(),
        ..Default::default()
    };
    let response = subscribe(&state.context(), &request)?;
    std::fs::write(output, &response.document.body)
        .with_context(|| format!("failed to write {}", output))?;
    info!(
        "Wrote {} subscription with {} entries to {}",
        response.target.as_str(),
        response.document.entries,
        output
    );
    Ok(())
}

fn listen_address(settings: &Settings) -> String {
    if settings.listen_address.trim().is_empty() {
        error!("Empty listen_address in settings, defaulting to 127.0.0.1");
        format!("127.0.0.1:{}", settings.listen_port)
    } else if settings.listen_address.contains(':') {
        // Already has a port, use as is
        settings.listen_address.clone()
    } else {
        format!("{}:{}", settings.listen_address, settings.listen_port)
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    if args.token.is_some() != args.output.is_some() {
        bail!("--token and -o/--output must be used together");
    }

    let mut settings = Settings::load_from_file(&args.config)
        .with_context(|| format!("failed to load settings from {}", args.config))?;
    if let Some(data) = args.data {
        settings.data_path = data;
    }
    if let Some(address) = args.address {
        settings.listen_address = address;
    }
    if let Some(port) = args.port {
        settings.listen_port = port;
    }

    let store = FileStore::load(&settings.data_path)
        .with_context(|| format!("failed to load data from {}", settings.data_path))?;
    let app_state = Arc::new(AppState::new(settings, store));
    info!("Using bundled rule set version {}", rules_version());

    if let (Some(token), Some(output)) = (args.token.as_deref(), args.output.as_deref()) {
        return render_to_file(&app_state, token, args.target.as_deref(), output);
    }

    let listen_address = listen_address(&app_state.config);
    let max_concur_threads = app_state.config.max_concur_threads.max(1);

    info!("Subpanel starting on {}", listen_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&app_state)))
            .configure(interfaces::config)
            // For health check
            .route("/", web::get().to(|| async { "Subpanel is running!" }))
    })
    .bind(&listen_address)?
    .workers(max_concur_threads)
    .run()
    .await?;

    Ok(())
}
