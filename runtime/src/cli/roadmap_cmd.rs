//! `japa roadmap` — generate a roadmap for a profile given on the command line.

use crate::cli::output;
use crate::config::Config;
use crate::error::RoadmapError;
use crate::roadmap::{RoadmapClient, UserProfile};
use anyhow::{Context, Result};

pub async fn run(profile: UserProfile, config: Config) -> Result<()> {
    let client = RoadmapClient::new(config.llm);
    match client.generate(&profile).await {
        Ok(roadmap) => output::print_json(&roadmap),
        Err(RoadmapError::ModelOutput { raw }) => {
            eprintln!("{raw}");
            anyhow::bail!("model output is not a valid roadmap")
        }
        Err(e) => Err(e).context("roadmap generation failed"),
    }
}
