//! Field Analytics Engine - command line runner
//!
//! Reads a JSON request, runs one analysis and prints the JSON record.
//!
//! ```text
//! field-analytics <field-map|monitor|plan|forecast-crop|forecast-field> <request.json>
//! field-analytics crops
//! ```

use anyhow::Context;
use field_analytics_engine::{
    external::StaticConditions, services::AnalyticsService, AnalyticsResult, Config,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{CropYieldRequest, SoilConditions, WeatherConditions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: field-analytics <field-map|monitor|plan|forecast-crop|forecast-field|crops> [request.json]";

/// Crop forecast request with the snapshots it should be evaluated against
#[derive(Debug, Deserialize)]
struct CropForecastInput {
    #[serde(flatten)]
    request: CropYieldRequest,
    weather: WeatherConditions,
    #[serde(default)]
    soil: Option<SoilConditions>,
}

fn parse<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).context("request file is not a valid request for this command")
}

fn to_json<T: Serialize>(result: AnalyticsResult<T>) -> AnalyticsResult<serde_json::Value> {
    Ok(serde_json::to_value(result?)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the JSON record
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "field_analytics=info,field_analytics_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    tracing::info!("Environment: {}", config.environment);

    let mut args = std::env::args().skip(1);
    let command = args.next().context(USAGE)?;

    let result = if command == "crops" {
        let service = AnalyticsService::from_config(&config, StaticConditions::default())?;
        to_json(Ok(service.supported_crops()))
    } else {
        let path = args.next().context(USAGE)?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read request file {}", path))?;

        match command.as_str() {
            "forecast-crop" => {
                let input: CropForecastInput = parse(&raw)?;
                let conditions = StaticConditions::new(input.weather, input.soil);
                let service = AnalyticsService::from_config(&config, conditions)?;
                to_json(service.forecast_crop_yield(input.request).await)
            }
            other => {
                let service = AnalyticsService::from_config(&config, StaticConditions::default())?;
                match other {
                    "field-map" => to_json(service.create_field_map(parse(&raw)?).await),
                    "monitor" => to_json(service.analyze_monitoring(parse(&raw)?).await),
                    "plan" => to_json(service.plan_application(parse(&raw)?).await),
                    "forecast-field" => to_json(service.forecast_field_yield(parse(&raw)?).await),
                    _ => anyhow::bail!("unknown command '{}'\n{}", other, USAGE),
                }
            }
        }
    };

    match result {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Analysis failed: {:?}", err);
            println!("{}", serde_json::to_string_pretty(&err.detail())?);
            std::process::exit(1);
        }
    }
}
