//! Current-weather client
//!
//! One stateless GET per lookup; the payload comes back exactly as the
//! provider sent it.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{config::ClientConfig, error::RequestError, model::Query};

/// Anything that can answer a [`Query`] with a raw provider payload.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn fetch(&self, query: &Query) -> Result<Value, RequestError>;
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: ClientConfig,
    http: Client,
}

impl WeatherClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http(config, Client::new())
    }

    /// Use a caller-built HTTP client, e.g. one with a timeout or proxy.
    pub fn with_http(config: ClientConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET <base>/weather?q={city}&appid={key}&units={units}`
    pub async fn fetch_by_city(
        &self,
        city: &str,
        units: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.fetch(&Query::by_city(city).with_units(units)).await
    }

    /// `GET <base>/weather?zip={postal_code},{country_code}&appid={key}&units={units}`
    pub async fn fetch_by_postal_code(
        &self,
        postal_code: &str,
        country_code: &str,
        units: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.fetch(&Query::by_postal_code(postal_code, country_code).with_units(units))
            .await
    }

    /// `GET <base>/weather?lat={latitude}&lon={longitude}&appid={key}&units={units}`
    pub async fn fetch_by_coordinates(
        &self,
        latitude: &str,
        longitude: &str,
        units: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.fetch(&Query::by_coordinates(latitude, longitude).with_units(units))
            .await
    }

    #[instrument(skip_all, fields(mode = query.mode(), units = query.units()))]
    pub async fn fetch(&self, query: &Query) -> Result<Value, RequestError> {
        logged(query.mode(), self.send(query)).await
    }

    async fn send(&self, query: &Query) -> Result<Value, RequestError> {
        let mut params = query.location_params();
        params.push(("appid", self.config.api_key().to_string()));
        params.push(("units", query.units().to_string()));

        let url = self.config.weather_url();
        debug!(url = %url, "Fetching current weather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(RequestError::Upstream { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn fetch(&self, query: &Query) -> Result<Value, RequestError> {
        WeatherClient::fetch(self, query).await
    }
}

/// Await `fut`, report a failure for `mode`, and hand the result back untouched.
async fn logged<T>(
    mode: &'static str,
    fut: impl Future<Output = Result<T, RequestError>>,
) -> Result<T, RequestError> {
    let result = fut.await;

    match &result {
        // reqwest errors render the request URL, which carries the credential.
        Err(RequestError::Transport(err)) => warn!(
            mode,
            connect = err.is_connect(),
            timeout = err.is_timeout(),
            "Error fetching weather by {mode}: transport failure"
        ),
        Err(err) => warn!(mode, error = %err, "Error fetching weather by {mode}"),
        Ok(_) => {}
    }

    result
}
