//! Wolfram|Alpha calculation provider.
//!
//! Uses the Short Answers API: one GET request, plain-text answer back.
//! The API returns 501 when it cannot produce a short answer for a query.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use valet_core::llm::Calculator;
use valet_types::llm::CalculationError;

/// Environment variable holding the Wolfram|Alpha app id.
pub const WOLFRAM_APP_ID_VAR: &str = "WOLFRAM_APP_ID";

const SHORT_ANSWERS_URL: &str = "https://api.wolframalpha.com/v1/result";

/// Computation provider backed by the Wolfram|Alpha Short Answers API.
///
/// Does NOT derive Debug to prevent accidental exposure of the app id.
pub struct WolframCalculator {
    http: reqwest::Client,
    app_id: SecretString,
}

impl WolframCalculator {
    pub fn new(app_id: SecretString) -> Self {
        WolframCalculator {
            http: reqwest::Client::new(),
            app_id,
        }
    }

    /// Build a calculator from `WOLFRAM_APP_ID`, or `None` when it is
    /// unset or empty.
    pub fn from_env() -> Option<Self> {
        match std::env::var(WOLFRAM_APP_ID_VAR) {
            Ok(app_id) if !app_id.trim().is_empty() => {
                Some(WolframCalculator::new(SecretString::from(app_id)))
            }
            _ => {
                tracing::warn!("{WOLFRAM_APP_ID_VAR} is not set, calculation action is disabled");
                None
            }
        }
    }
}

impl Calculator for WolframCalculator {
    async fn query(&self, input: &str) -> Result<String, CalculationError> {
        tracing::debug!(query = input, "wolfram short-answers request");

        let response = self
            .http
            .get(SHORT_ANSWERS_URL)
            .query(&[
                ("appid", self.app_id.expose_secret()),
                ("i", input),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| CalculationError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| CalculationError::Request(e.to_string())),
            StatusCode::NOT_IMPLEMENTED => Err(CalculationError::NoResult(input.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CalculationError::Request(format!("{status}: {body}")))
            }
        }
    }
}
