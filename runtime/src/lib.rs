// Copyright 2026 JapaAdvisor Contributors
// SPDX-License-Identifier: Apache-2.0

//! JapaAdvisor runtime library — study-abroad planning backend.
//!
//! Scrapes official study-visa requirement pages for a fixed set of
//! destination countries, normalizes them into document checklists, and
//! generates personalized roadmaps through an LLM.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod renderer;
pub mod requirements;
pub mod rest;
pub mod roadmap;
