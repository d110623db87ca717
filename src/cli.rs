// Copyright 2025 Fernando Borretti
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

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::bank::MISSING_BANK_EXIT_CODE;
use crate::bank::find_default_bank;
use crate::check::check_bank;
use crate::drill::server::DrillConfig;
use crate::drill::server::start_server;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::history::print_history;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Command {
    /// Path to the question bank JSON.
    #[arg(long)]
    file: Option<PathBuf>,
    /// How many questions to offer by default.
    #[arg(long, default_value_t = 5)]
    count: usize,
    /// Use the dark theme.
    #[arg(long)]
    dark: bool,
    /// Validate the question bank and exit.
    #[arg(long)]
    validate: bool,
    /// Print the score history as JSON and exit.
    #[arg(long)]
    history: bool,
    /// Directory holding the mastered, missed, and history files. Defaults
    /// to the current directory.
    #[arg(long)]
    state_dir: Option<PathBuf>,
    /// Port for the quiz server.
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Don't open the browser automatically.
    #[arg(long)]
    no_open: bool,
}

pub async fn entrypoint() -> Fallible<ExitCode> {
    let cli: Command = Command::parse();
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    if cli.history {
        print_history(&state_dir)?;
        return Ok(ExitCode::SUCCESS);
    }
    let bank_path = match cli.file {
        Some(path) => {
            if !path.exists() {
                return Err(ErrorReport::new(format!(
                    "Could not find the questions JSON at {}.",
                    path.display()
                ))
                .with_exit_code(MISSING_BANK_EXIT_CODE));
            }
            path
        }
        None => find_default_bank()?,
    };
    log::debug!("Using question bank {}.", bank_path.display());
    if cli.validate {
        return check_bank(&bank_path);
    }
    let config = DrillConfig {
        bank_path,
        state_dir,
        count: cli.count,
        dark: cli.dark,
        port: cli.port,
        open_browser: !cli.no_open,
    };
    start_server(config).await?;
    Ok(ExitCode::SUCCESS)
}
