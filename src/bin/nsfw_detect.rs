// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use imgscan::cli::{nsfw, NsfwArgs};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();
    imgscan::logging::init();

    let args = NsfwArgs::parse();

    let outcome = nsfw::run(args);
    if let Err(e) = &outcome {
        eprintln!("Error: {:#}", e);
    }
    ExitCode::from(nsfw::exit_status(&outcome))
}
