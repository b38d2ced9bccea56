//! Sample CLI built on the imperative framework.
//!
//! Loads its command tree from `demos/sample-cli.toml` and registers a
//! handful of demo handlers. Used by the integration tests.

use std::{env, error::Error, process, time::Duration};

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use imperative::{
    cli::{
        CliService, CommandHandler, ExpectedError, HandlerError, HandlerParameters,
        HandlerRegistry, formatting::format_error,
    },
    config::ImperativeConfig,
    definition::CommandDefinition,
    tracing_config,
};

const DEFINITIONS: &str = include_str!("../../demos/sample-cli.toml");

#[derive(Default)]
struct EatBanana;

#[async_trait]
impl CommandHandler for EatBanana {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let color = params.arguments.get_str("color").unwrap_or_default().to_string();
        let flavor = params.arguments.get_str("flavor").unwrap_or_default().to_string();
        let quantity = params.arguments.get_f64("quantity").unwrap_or(1.0);
        let place = params
            .arguments
            .get_str("where")
            .unwrap_or("the kitchen")
            .to_string();
        let toppings = params.arguments.get_list("toppings").unwrap_or_default();

        if let Some(fruit) = params.profiles.get("fruit") {
            debug!(profile = %fruit.name, "eating with fruit profile");
        }

        params.response.log(format!(
            "You ate {quantity} {color} banana(s) in {place}. Flavor: {flavor}"
        ));
        if !toppings.is_empty() {
            params
                .response
                .log(format!("Toppings: {}", toppings.join(", ")));
        }
        if params.arguments.flag("hungry") {
            params.response.log("You are still hungry.");
        }

        params.response.set_obj(
            json!({
                "color": color,
                "flavor": flavor,
                "quantity": quantity,
                "where": place,
                "toppings": toppings,
            }),
            false,
        );
        Ok(())
    }
}

#[derive(Default)]
struct EatCake;

#[async_trait]
impl CommandHandler for EatCake {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let kind = if params.arguments.flag("chocolate") {
            "chocolate"
        } else {
            "vanilla"
        };
        let candles = params.arguments.get_f64("candles").unwrap_or(0.0);

        if candles > 0.0 && params.arguments.flag("hungry") {
            return Err(ExpectedError::new("You cannot eat a cake with lit candles")
                .details("Blow the candles out first.")
                .exit_code(3)
                .into());
        }

        params.response.log(format!("You ate a slice of {kind} cake."));
        params
            .response
            .set_obj(json!({ "kind": kind, "candles": candles }), false);
        Ok(())
    }
}

#[derive(Default)]
struct RespondWithData;

#[async_trait]
impl CommandHandler for RespondWithData {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let message = params
            .arguments
            .get_str("message")
            .unwrap_or_default()
            .to_string();

        params.response.log("Responding with data");
        params.response.set_message(message);
        params.response.set_obj(
            json!({ "fruits": ["apple", "banana"], "count": 2 }),
            false,
        );
        Ok(())
    }
}

#[derive(Default)]
struct ProgressCount;

#[async_trait]
impl CommandHandler for ProgressCount {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let steps = params.arguments.get_f64("steps").unwrap_or(5.0).clamp(1.0, 100.0) as u64;

        params.response.start_bar("counting");
        for step in 1..=steps {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let percent = u8::try_from(step * 100 / steps).unwrap_or(100);
            params.response.update_bar(percent, &format!("step {step} of {steps}"));
        }
        params.response.end_bar();

        params.response.log(format!("Counted to {steps}"));
        params.response.set_obj(json!({ "steps": steps }), false);
        Ok(())
    }
}

#[derive(Default)]
struct Explode;

#[async_trait]
impl CommandHandler for Explode {
    async fn process(&self, _params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        Err(HandlerError::unexpected(std::io::Error::other(
            "the banana stand is on fire",
        )))
    }
}

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_default::<EatBanana>("eat.banana");
    registry.register_default::<EatCake>("eat.cake");
    registry.register_default::<RespondWithData>("respond.with-data");
    registry.register_default::<ProgressCount>("progress.count");
    registry.register_default::<Explode>("invalid.explode");
    registry
}

async fn run(args: &[String]) -> Result<i32, Box<dyn Error>> {
    let config = ImperativeConfig::builder("sample-cli")
        .display_name("Sample CLI")
        .env_prefix("SAMPLE")
        .profile_type("fruit")
        .build(&imperative::arguments::ProcessEnvironment)?;

    let general = config.load_config_file()?.general;
    let _guard = if general.log_to_file {
        tracing_config::init_with_file(&config, general.log_level)
            .map(Some)
            .unwrap_or_else(|error| {
                eprintln!("{}: {error}", format_error("Logging unavailable"));
                None
            })
    } else {
        if let Err(error) = tracing_config::init(&config, general.log_level) {
            eprintln!("{}: {error}", format_error("Logging unavailable"));
        }
        None
    };

    let root = CommandDefinition::from_toml_str(DEFINITIONS)?;
    let service = CliService::new(config, root, registry())?;

    Ok(service.run(args).await)
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let code = match run(&args).await {
        Ok(code) => code,
        Err(error) => {
            warn!(error = %error, "sample CLI failed to start");
            eprintln!("{}: {error}", format_error("Error"));
            1
        }
    };

    process::exit(code);
}
