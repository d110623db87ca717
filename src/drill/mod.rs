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

mod get;
mod post;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::fs::create_dir;
    use std::fs::read_to_string;
    use std::fs::write;
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::Value;
    use serde_json::json;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::drill::server::DrillConfig;
    use crate::drill::server::start_server;
    use crate::error::Fallible;
    use crate::helper::create_tmp_directory;
    use crate::helper::write_bank;
    use crate::memory::HISTORY_FILE;
    use crate::memory::MASTERED_FILE;
    use crate::memory::MISSED_FILE;

    /// Start a server on a free port and wait until it accepts connections.
    /// Returns the base URL and the state directory.
    async fn serve(bank: Value, count: usize) -> Fallible<(String, PathBuf)> {
        let dir = create_tmp_directory()?;
        create_dir(dir.join("Images"))?;
        write(dir.join("Images/diagram.png"), b"PNG")?;
        let bank_path = write_bank(&dir, &bank)?;
        let state_dir = dir.join("state");
        let port = portpicker::pick_unused_port().expect("no free port");
        let config = DrillConfig {
            bank_path,
            state_dir: state_dir.clone(),
            count,
            dark: false,
            port,
            open_browser: false,
        };
        spawn(async move { start_server(config).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok((format!("http://{bind}/"), state_dir))
    }

    async fn post(url: &str, form: &[(&str, &str)]) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(url)
            .form(form)
            .send()
            .await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        Ok(html)
    }

    fn choice_question(text: &str) -> Value {
        json!({
            "question": text,
            "options": ["Foo", "Bar", "Baz"],
            "answer": "A",
            "explanation": "Foo is **right**.",
            "image": "Images/diagram.png"
        })
    }

    fn count_entries(path: PathBuf) -> usize {
        let content = read_to_string(path).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        value.as_array().unwrap().len()
    }

    #[tokio::test]
    async fn test_start_server_on_missing_bank() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let config = DrillConfig {
            bank_path: dir.join("missing.json"),
            state_dir: dir,
            count: 5,
            dark: false,
            port: 0,
            open_browser: false,
        };
        let result = start_server(config).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_static_endpoints() -> Fallible<()> {
        let (url, _) = serve(json!({"Topic": [choice_question("Q1")]}), 5).await?;

        let response = reqwest::get(format!("{url}style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        let response = reqwest::get(format!("{url}image/Images/diagram.png")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

        let response = reqwest::get(format!("{url}image/Images/missing.png")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = reqwest::get(format!("{url}image/..%2F..%2Fetc%2Fpasswd")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = reqwest::get(format!("{url}herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let bank = json!({
            "Topic": [choice_question("Q1"), choice_question("Q2")]
        });
        let (url, state_dir) = serve(bank, 2).await?;

        // The start screen.
        let html = reqwest::get(&url).await?.text().await?;
        assert!(html.contains("How many questions would you like to answer?"));
        assert!(html.contains("2 questions in 1 topics. 0 mastered, 0 missed."));

        // Start.
        let html = post(&url, &[("count", "2"), ("action", "Start")]).await?;
        assert!(html.contains("Question 1"));
        assert!(html.contains("1 / 2"));
        assert!(html.contains("/image/Images/diagram.png"));
        assert!(html.contains("A. Foo"));

        // Answer correctly.
        let html = post(&url, &[("choice", "A"), ("action", "Submit")]).await?;
        assert!(html.contains("Correct!"));
        assert!(html.contains("Foo is <strong>right</strong>."));

        let html = post(&url, &[("action", "Next")]).await?;
        assert!(html.contains("Question 2"));

        // Answer wrongly.
        let html = post(&url, &[("choice", "A"), ("choice", "C"), ("action", "Submit")]).await?;
        assert!(html.contains("Wrong! Correct answer: A. Foo"));

        let html = post(&url, &[("action", "Next")]).await?;
        assert!(html.contains("Quiz Ended"));
        assert!(html.contains("Score: 1/2 (50.00%)"));
        assert!(html.contains("Try harder"));
        assert!(html.contains("Score History"));

        assert_eq!(count_entries(state_dir.join(MASTERED_FILE)), 1);
        assert_eq!(count_entries(state_dir.join(MISSED_FILE)), 1);
        assert_eq!(count_entries(state_dir.join(HISTORY_FILE)), 1);

        // A new quiz asks the missed question only.
        let html = post(&url, &[("action", "New Quiz")]).await?;
        assert!(html.contains("1 mastered, 1 missed."));
        let html = post(&url, &[("count", "5"), ("action", "Start")]).await?;
        assert!(html.contains("1 / 1"));
        let html = post(&url, &[("choice", "A"), ("action", "Submit")]).await?;
        assert!(html.contains("Correct!"));
        let html = post(&url, &[("action", "Next")]).await?;
        assert!(html.contains("Score: 1/1 (100.00%)"));
        assert!(html.contains("Passed"));

        assert_eq!(count_entries(state_dir.join(MASTERED_FILE)), 2);
        assert_eq!(count_entries(state_dir.join(MISSED_FILE)), 0);
        assert_eq!(count_entries(state_dir.join(HISTORY_FILE)), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_submit_is_ignored() -> Fallible<()> {
        let bank = json!({
            "Topic": [choice_question("Q1"), choice_question("Q2")]
        });
        let (url, state_dir) = serve(bank, 2).await?;
        post(&url, &[("count", "2"), ("action", "Start")]).await?;
        let html = post(&url, &[("number", "1"), ("choice", "A"), ("action", "Submit")]).await?;
        assert!(html.contains("Correct!"));

        // The same form sent again while the verdict is still shown.
        let html = post(&url, &[("number", "1"), ("choice", "A"), ("action", "Submit")]).await?;
        assert!(html.contains("Question 1"));
        assert!(html.contains("Correct!"));
        assert_eq!(count_entries(state_dir.join(MASTERED_FILE)), 1);
        assert!(!state_dir.join(HISTORY_FILE).exists());

        // A stale form for the first question, after moving on.
        let html = post(&url, &[("action", "Next")]).await?;
        assert!(html.contains("Question 2"));
        assert!(html.contains("name=\"number\" value=\"2\""));
        let html = post(&url, &[("number", "1"), ("choice", "A"), ("action", "Submit")]).await?;
        assert!(html.contains("2 / 2"));
        assert_eq!(count_entries(state_dir.join(MASTERED_FILE)), 1);
        assert!(!state_dir.join(HISTORY_FILE).exists());

        let html = post(&url, &[("number", "2"), ("choice", "C"), ("action", "Submit")]).await?;
        assert!(html.contains("Wrong! Correct answer: A. Foo"));
        let html = post(&url, &[("action", "Next")]).await?;
        assert!(html.contains("Score: 1/2 (50.00%)"));
        assert_eq!(count_entries(state_dir.join(MASTERED_FILE)), 1);
        assert_eq!(count_entries(state_dir.join(MISSED_FILE)), 1);
        assert_eq!(count_entries(state_dir.join(HISTORY_FILE)), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_drag_and_drop() -> Fallible<()> {
        let bank = json!({
            "KQL": [{
                "question": "Order the operators.",
                "options": ["SigninLogs", "where Result == 0 | project User", "count"],
                "answer": ["SigninLogs", "where Result == 0 | project User", "count"],
                "type": "drag_and_drop"
            }]
        });
        let (url, _) = serve(bank, 5).await?;
        let html = post(&url, &[("count", "5"), ("action", "Start")]).await?;
        assert!(html.contains("Select option"));
        assert_eq!(html.matches("<select").count(), 3);
        let html = post(
            &url,
            &[
                ("slot", "count"),
                ("slot", "SigninLogs"),
                ("slot", "where Result == 0 | project User"),
                ("action", "Submit"),
            ],
        )
        .await?;
        assert!(html.contains(
            "Wrong! Correct sequence: SigninLogs, where Result == 0 | project User, count"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_end_early_and_reset() -> Fallible<()> {
        let bank = json!({
            "Topic": [choice_question("Q1"), choice_question("Q2"), choice_question("Q3")]
        });
        let (url, state_dir) = serve(bank, 3).await?;
        post(&url, &[("count", "3"), ("action", "Start")]).await?;
        post(&url, &[("choice", "B"), ("action", "Submit")]).await?;
        post(&url, &[("action", "Next")]).await?;
        let html = post(&url, &[("action", "End")]).await?;
        assert!(html.contains("Score: 0/1 (0.00%)"));
        assert_eq!(count_entries(state_dir.join(MISSED_FILE)), 1);

        let html = post(&url, &[("action", "New Quiz")]).await?;
        assert!(html.contains("0 mastered, 1 missed."));
        let html = post(
            &url,
            &[("count", "1"), ("reset_missed", "on"), ("action", "Start")],
        )
        .await?;
        assert!(html.contains("1 / 1"));
        assert!(!state_dir.join(MISSED_FILE).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_count_and_empty_pool() -> Fallible<()> {
        let (url, _) = serve(json!({"Topic": []}), 5).await?;
        let html = post(&url, &[("count", "lots"), ("action", "Start")]).await?;
        assert!(html.contains("Please enter a valid number."));
        let html = post(&url, &[("count", "5"), ("action", "Start")]).await?;
        assert!(html.contains("Score: 0/1 (0.00%)"));
        Ok(())
    }
}
