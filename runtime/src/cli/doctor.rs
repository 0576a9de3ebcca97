//! Environment readiness check.

use crate::cli::output::check_mark;
use crate::config::Config;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Report Chromium availability and model configuration.
pub fn run(config: &Config) -> Result<()> {
    println!("JapaAdvisor Doctor");
    println!("==================");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium = find_chromium(config.fetch.chromium_path.as_ref());
    match &chromium {
        Some(path) => println!("{} Chromium found: {}", check_mark(true), path.display()),
        None => println!(
            "{} Chromium NOT found. Set JAPA_CHROMIUM_PATH or install google-chrome.",
            check_mark(false)
        ),
    }

    let has_key = config.llm.api_key.is_some();
    if has_key {
        println!(
            "{} Model: {} at {}",
            check_mark(true),
            config.llm.model,
            config.llm.base_url
        );
    } else {
        println!("{} OPENAI_API_KEY is not set", check_mark(false));
    }

    println!(
        "{} Settle delay: {}ms (secondary {}ms)",
        check_mark(true),
        config.fetch.settle_delay.as_millis(),
        config.fetch.secondary_settle_delay.as_millis()
    );

    println!();
    if chromium.is_some() && has_key {
        println!("Status: READY");
    } else {
        println!("Status: DEGRADED");
        if chromium.is_none() {
            println!("  Rendered sources will be replaced by curated fallback data.");
        }
        if !has_key {
            println!("  Roadmap generation is unavailable.");
        }
    }

    Ok(())
}
