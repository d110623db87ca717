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
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::bank::Bank;
use crate::drill::get::get_handler;
use crate::drill::post::post_handler;
use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::media::ImageLoader;
use crate::media::content_type;
use crate::memory::Memory;

pub struct DrillConfig {
    pub bank_path: PathBuf,
    /// Where the mastered, missed, and history files live.
    pub state_dir: PathBuf,
    /// The question count offered on the start screen.
    pub count: usize,
    pub dark: bool,
    pub port: u16,
    pub open_browser: bool,
}

pub async fn start_server(config: DrillConfig) -> Fallible<()> {
    let bank = Bank::load(&config.bank_path)?;
    log::debug!(
        "Found {} questions in {} topics.",
        bank.question_count(),
        bank.topics().len()
    );
    if bank.question_count() == 0 {
        log::warn!("The question bank has no playable questions.");
    }
    let memory = Memory::load(config.state_dir)?;
    let images = ImageLoader::new(bank.directory().to_path_buf());

    let state = ServerState {
        bank: Arc::new(bank),
        images,
        default_count: config.count,
        dark: config.dark,
        mutable: Arc::new(Mutex::new(MutableState {
            memory,
            session: None,
            feedback: None,
            summary: None,
            notice: None,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.route("/image/{*path}", get(image_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{}", config.port);

    // Start a separate task to open the browser.
    let url = format!("http://{bind}/");
    println!("Quiz running at {url}");
    if config.open_browser {
        let bind = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&bind).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            if let Err(e) = open::that(&url) {
                log::warn!("Failed to open the browser: {e}");
            }
        });
    }

    // Start the server.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn image_handler(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> (StatusCode, [(HeaderName, &'static str); 1], Vec<u8>) {
    let not_found = (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        b"Not Found".to_vec(),
    );
    let path = match state.images.validate(&path) {
        Ok(path) => path,
        Err(e) => {
            log::debug!("Rejected image request {path}: {e:?}");
            return not_found;
        }
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, content_type(&path))], bytes),
        Err(e) => {
            log::warn!("Failed to read image {}: {e}", path.display());
            not_found
        }
    }
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
