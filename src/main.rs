#![allow(dead_code)]
#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;
mod web;

use anyhow::Result;
use cli::Cli;
use clap::Parser;
use tracing_subscriber::{filter::Directive, EnvFilter};

fn main() -> Result<()> {
    // HOST / PORT / RUST_LOG may come from a local .env file
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::from_default_env();
    let filter = match "imdb_sentiment=info".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_)        => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    cli.run()
}
