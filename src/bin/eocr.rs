// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use imgscan::cli::{ocr, OcrArgs};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();
    imgscan::logging::init();

    let args = OcrArgs::parse();

    match ocr::run(args, &mut std::io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
