// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;

use house_price_client::{init_logging, Config, HousingInputs, PredictionPayload, PredictionService};

const USAGE: &str = "\
Usage: house-price [COMMAND]

Commands:
  (none)          Open the interactive prediction form
  payload         Print the JSON payload built from the default inputs
  predict [URL]   Send the default inputs once and print the result
  help            Show this message

Environment:
  PREDICT_URL           Prediction service URL (default http://127.0.0.1:8000/invocations)
  PREDICT_TIMEOUT_SECS  Request timeout in seconds (default 30)
  RUST_LOG              Log filter";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    run(&args)
}

/// Dispatch a command. Only commands that talk to the service read the environment.
fn run(args: &[String]) -> Result<()> {
    match args.get(1).map(String::as_str) {
        None => run_ui_mode(&Config::from_env()?),
        Some("payload") => run_payload(),
        Some("predict") => run_predict(&Config::from_env()?, args.get(2).map(String::as_str)),
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command {:?}\n\n{}", other, USAGE),
    }
}

fn run_payload() -> Result<()> {
    let payload = PredictionPayload::from_inputs(&HousingInputs::default());
    println!("{}", payload.to_pretty_json()?);
    Ok(())
}

fn run_predict(config: &Config, url: Option<&str>) -> Result<()> {
    init_logging("warn");

    let url = url.unwrap_or(&config.service_url);
    let client = config.client()?;
    let payload = PredictionPayload::from_inputs(&HousingInputs::default());

    match client.predict(url, &payload) {
        Ok(prediction) => {
            println!("{}", prediction.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    // Anything louder than errors would draw over the alternate screen
    init_logging("error");

    let client = config.client()?;
    let form = house_price_client::FormState::new(config.service_url.clone());
    let mut app = ui::App::new(form, Box::new(client));

    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ Interactive form not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the browser form: cargo run --bin house-price-server --features server");
    std::process::exit(1);
}
