//! Personalized study-abroad roadmaps generated by an LLM.
//!
//! The user's profile is turned into a single prompt asking for a JSON
//! object; the model's answer is parsed into a [`Roadmap`]. Answers that are
//! not valid JSON of that shape are reported with the raw text so they can
//! be inspected.

pub mod client;

use serde::{Deserialize, Serialize};

pub use client::RoadmapClient;

/// Profile submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub degree: String,
    pub work_experience: String,
    pub target_country: String,
    pub goal: String,
}

/// Kind of a suggested opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityKind {
    Scholarship,
    University,
    Visa,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
}

/// Structured model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Short narrative of the steps to take.
    pub roadmap: String,
    /// Five to seven practical steps and documents.
    pub checklist: Vec<String>,
    /// Statement of purpose.
    pub sop: String,
    /// Three to five scholarship, university or visa links.
    pub opportunities: Vec<Opportunity>,
}

pub const SYSTEM_PROMPT: &str = "You are an education and immigration advisor.";

/// Build the user prompt for `profile`.
pub fn build_prompt(profile: &UserProfile) -> String {
    let country = &profile.target_country;
    format!(
        r#"You are an expert immigration and education advisor. A Nigerian user has submitted the following profile:

- Name: {name}
- Degree: {degree}
- Work Experience: {work}
- Target Country: {country}
- Career/Education Goal: {goal}

Your job is to return a structured JSON object with 4 fields:

1. "roadmap": A short paragraph explaining the steps this person should take to move to {country}.
2. "checklist": A JSON list of 5-7 bullet points with practical steps and documents.
3. "sop": A formal academic-style Statement of Purpose based on their background and goal.
4. "opportunities": A list of 3-5 relevant links to scholarship, visa, or university resources for {country}. Each item should include:
   - "title": short name of the opportunity
   - "url": a valid link (you can use placeholders if needed)
   - "type": one of ["scholarship", "university", "visa", "other"]

Return ONLY a valid JSON object like this:
{{
  "roadmap": "...",
  "checklist": ["...", "..."],
  "sop": "...",
  "opportunities": [
    {{
      "title": "...",
      "url": "...",
      "type": "scholarship"
    }}
  ]
}}

Do not include any explanations, formatting, or markdown, only valid JSON."#,
        name = profile.full_name,
        degree = profile.degree,
        work = profile.work_experience,
        goal = profile.goal,
    )
}
