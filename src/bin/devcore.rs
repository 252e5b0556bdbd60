// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use devcore::core::machine::{MachineDescription, RunningMachine};
use log::{error, info};
use std::path::PathBuf;

/// Start, reset and stop the devices of a machine description
#[derive(Parser)]
#[command(name = "devcore")]
#[command(about = "Device lifecycle runner", long_about = None)]
struct Args {
    /// Path to a machine description (TOML); the built-in board if omitted
    config: Option<PathBuf>,

    /// Number of machine resets to perform
    #[arg(short = 'r', long, default_value = "1")]
    resets: usize,

    /// Print the device summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (RUST_LOG and friends)
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("devcore v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let description = match &args.config {
        Some(path) => {
            info!("Loading machine description from: {}", path.display());
            MachineDescription::load(path)
        }
        None => {
            info!("No description given, using the built-in board");
            MachineDescription::default_board()
        }
    }
    .inspect_err(|e| error!("Failed to load machine description: {}", e))?;

    let config = description
        .into_config()
        .inspect_err(|e| error!("Invalid machine description: {}", e))?;

    let machine = RunningMachine::start(config).inspect_err(|e| {
        if e.is_fatal() {
            error!("Fatal error while starting devices: {}", e);
        }
    })?;

    for i in 0..args.resets {
        info!("Reset {}/{}", i + 1, args.resets);
        machine.reset()?;
    }

    let summary = machine.summarize();
    machine.exit()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for device in &summary {
            info!(
                "{:<12} {:<16} {:<12} token={:>3} region={:#x}",
                device.tag,
                device.name,
                format!("{:?}", device.class),
                device.token_bytes,
                device.region_bytes
            );
        }
    }

    info!("Machine stopped cleanly");
    Ok(())
}
