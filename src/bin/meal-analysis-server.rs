// ABOUTME: Server binary for the meal analysis API
// ABOUTME: Loads environment configuration, initializes logging, and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Analysis Server Binary
//!
//! Starts the HTTP API that turns meal descriptions into nutrition estimates.

use anyhow::Result;
use clap::Parser;
use meal_analysis_server::{config::ServerConfig, logging, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "meal-analysis-server")]
#[command(about = "Meal analysis API - nutrition estimates from meal descriptions via an LLM")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    info!("{}", config.summary());
    info!("Endpoints: POST /api/analyze-meal, GET /api/debug, GET /health, GET /ready");

    if let Err(e) = server::run(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
