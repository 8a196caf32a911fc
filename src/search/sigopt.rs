use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Environment variable holding the SigOpt API token.
pub const TOKEN_ENV: &str = "SIGOPT_API_TOKEN";

/// A remote optimization experiment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Experiment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One suggested parameter assignment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub assignments: Map<String, Value>,
}

/// Acknowledgement of a reported value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Observation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Request/response protocol of a remote hyperparameter optimizer.
pub trait OptimizationService {
    fn create_experiment(&mut self, name: &str, parameters: &Value) -> Result<Experiment>;

    fn create_suggestion(&mut self, experiment_id: &str) -> Result<Suggestion>;

    fn create_observation(
        &mut self,
        experiment_id: &str,
        suggestion_id: &str,
        value: f64,
    ) -> Result<Observation>;
}

/// Blocking client for the SigOpt REST API, authenticated with the API
/// token as basic-auth user name. One connection serves a whole session.
pub struct SigOptConnection {
    client: Client,
    base_url: String,
    token: String,
}

impl SigOptConnection {
    pub fn new(base_url: &str, token: &str) -> Result<SigOptConnection> {
        Ok(SigOptConnection {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Connects with the token found in `SIGOPT_API_TOKEN`.
    pub fn from_env(base_url: &str) -> Result<SigOptConnection> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| HarnessError::Config(format!("{TOKEN_ENV} is not set")))?;
        SigOptConnection::new(base_url, &token)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "SigOpt request");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.token, Some(""))
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(HarnessError::SigOpt(format!("POST {path} returned {status}: {text}")));
        }
        Ok(response.json()?)
    }
}

impl OptimizationService for SigOptConnection {
    fn create_experiment(&mut self, name: &str, parameters: &Value) -> Result<Experiment> {
        self.post("/experiments", &json!({ "name": name, "parameters": parameters }))
    }

    fn create_suggestion(&mut self, experiment_id: &str) -> Result<Suggestion> {
        self.post(&format!("/experiments/{experiment_id}/suggestions"), &json!({}))
    }

    fn create_observation(
        &mut self,
        experiment_id: &str,
        suggestion_id: &str,
        value: f64,
    ) -> Result<Observation> {
        self.post(
            &format!("/experiments/{experiment_id}/observations"),
            &json!({ "suggestion": suggestion_id, "value": value }),
        )
    }
}

/// Reads the parameter-space definition passed to `create_experiment`.
pub fn load_parameters(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected an id, found {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_may_be_strings_or_numbers() {
        let e: Experiment = serde_json::from_str(r#"{"id": 1234, "name": "cnn"}"#).unwrap();
        assert_eq!(e.id, "1234");
        let s: Suggestion =
            serde_json::from_str(r#"{"id": "9", "assignments": {"lr": 0.05}, "extra": true}"#).unwrap();
        assert_eq!(s.id, "9");
        assert_eq!(s.assignments["lr"], 0.05);
    }

    #[test]
    fn missing_token_is_a_config_error() {
        std::env::remove_var(TOKEN_ENV);
        let err = SigOptConnection::from_env("http://localhost").err().unwrap();
        assert!(matches!(err, HarnessError::Config(_)));
    }
}
