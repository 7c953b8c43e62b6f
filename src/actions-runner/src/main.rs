//! Destination actions runner.
//!
//! Describes the action catalog and forwards single events to their
//! destination.

use std::io::Read;

use actions_braze::{BrazeClient, BrazeSettings, TrackPurchase};
use actions_core::config::AppConfig;
use actions_core::{
    ActionDefinition, BrowserAction, CloudAction, ReqwestTransport, Subscription,
};
use actions_sprig::{IdentifyUser, SprigSettings};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "actions-runner")]
#[command(about = "Forward customer-data events to destination actions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the field schema of every action as JSON
    Describe,
    /// Forward one event, read from a file or `-` for stdin
    Send {
        #[arg(long, default_value = "-")]
        event: String,

        /// JSON object of per-field bindings that replace the defaults
        #[arg(long)]
        mapping: Option<String>,

        /// Sprig API key (overrides config)
        #[arg(long, env = "DESTINATION_ACTIONS__SPRIG__API_KEY")]
        sprig_api_key: Option<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    SprigIdentify,
    BrazeTrackPurchase,
    Unrouted,
}

fn route(event: &Value, purchase: &Subscription) -> Route {
    if event.get("type").and_then(Value::as_str) == Some("identify") {
        Route::SprigIdentify
    } else if purchase.matches(event) {
        Route::BrazeTrackPurchase
    } else {
        Route::Unrouted
    }
}

fn event_type(event: &Value) -> &str {
    event.get("type").and_then(Value::as_str).unwrap_or("unknown")
}

fn catalog(track_purchase: &TrackPurchase, identify_user: &IdentifyUser) -> Vec<ActionDefinition> {
    vec![
        <TrackPurchase as BrowserAction<dyn BrazeClient>>::definition(track_purchase).clone(),
        identify_user.definition().clone(),
    ]
}

fn read_event(source: &str) -> anyhow::Result<Value> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading event from {}", source))?
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actions_runner=info,actions_core=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let track_purchase = TrackPurchase::new();
    let identify_user = IdentifyUser::new();

    match cli.command {
        Command::Describe => {
            let definitions = catalog(&track_purchase, &identify_user);
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        Command::Send {
            event,
            mapping,
            sprig_api_key,
        } => {
            if let Some(key) = sprig_api_key {
                config.sprig.api_key = key;
            }

            let event = read_event(&event)?;
            let overrides: Option<Map<String, Value>> = mapping
                .map(|m| serde_json::from_str(&m))
                .transpose()
                .context("mapping must be a JSON object")?;

            let purchase_subscription = Subscription::parse(
                <TrackPurchase as BrowserAction<dyn BrazeClient>>::definition(&track_purchase)
                    .default_subscription
                    .as_deref()
                    .unwrap_or_default(),
            )?;

            match route(&event, &purchase_subscription) {
                Route::SprigIdentify => {
                    let settings = SprigSettings {
                        api_key: config.sprig.api_key.clone(),
                    };
                    settings.validate()?;

                    let transport = ReqwestTransport::new(&config.http)?;
                    let response = identify_user
                        .run(&transport, &settings, &event, overrides.as_ref())
                        .await?;
                    info!(
                        status = response.status,
                        endpoint = identify_user.endpoint(),
                        "identify forwarded to Sprig"
                    );
                    println!("{}", serde_json::to_string(&response)?);
                }
                Route::BrazeTrackPurchase => {
                    BrazeSettings::from(&config.braze).validate()?;
                    warn!(
                        subscription = purchase_subscription.as_str(),
                        "track purchase needs a browser session with the Braze SDK; skipping"
                    );
                }
                Route::Unrouted => {
                    warn!(
                        event_type = event_type(&event),
                        "no action subscribed to event; dropping"
                    );
                }
            }
        }
    }

    Ok(())
}
