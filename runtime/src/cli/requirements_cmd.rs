//! `japa requirements <country>` — scrape and print one country's requirements.

use crate::cli::output;
use crate::config::Config;
use crate::fetch::LiveFetcher;
use crate::requirements::dispatch::Dispatcher;
use crate::requirements::RenderTimings;
use anyhow::Result;

pub async fn run(country: &str, config: Config) -> Result<()> {
    let dispatcher = Dispatcher::new(RenderTimings::from(&config.fetch));
    let fetcher = LiveFetcher::new(config.fetch);
    let result = dispatcher.requirements(country, &fetcher).await?;
    output::print_json(&result)
}
