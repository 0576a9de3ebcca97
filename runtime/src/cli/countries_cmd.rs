//! `japa countries` — list supported destination countries.

use crate::cli::output;
use crate::config::Config;
use crate::requirements::dispatch::Dispatcher;
use crate::requirements::RenderTimings;
use anyhow::Result;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let dispatcher = Dispatcher::new(RenderTimings::from(&config.fetch));
    let countries = dispatcher.supported();
    if json {
        return output::print_json(&serde_json::json!({ "countries": countries }));
    }
    for country in countries {
        println!("{country}");
    }
    Ok(())
}
