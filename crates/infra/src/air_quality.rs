//! Live air-quality lookups (OpenWeather geocoding + air pollution APIs).

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use smartair_core::AirQualityIndex;

use crate::config::AirQualityConfig;

#[derive(Debug, Error)]
pub enum AirQualityError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key not configured")]
    NoApiKey,

    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("no air quality reading near lat={lat}, lon={lon}")]
    NoReading { lat: f64, lon: f64 },
}

/// Source of the current AQI for a city.
#[async_trait]
pub trait AirQualitySource: Send + Sync + 'static {
    async fn current_aqi(&self, city: &str) -> Result<AirQualityIndex, AirQualityError>;
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    main: AirPollutionMain,
}

#[derive(Debug, Deserialize)]
struct AirPollutionMain {
    aqi: i64,
}

/// OpenWeather-backed [`AirQualitySource`]: geocode, then fetch pollution.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &AirQualityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn geocode(&self, city: &str, api_key: &str) -> Result<GeoLocation, AirQualityError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let locations: Vec<GeoLocation> = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        locations
            .into_iter()
            .next()
            .ok_or_else(|| AirQualityError::CityNotFound(city.to_string()))
    }

    async fn pollution(&self, location: &GeoLocation, api_key: &str) -> Result<AirQualityIndex, AirQualityError> {
        let url = format!("{}/data/2.5/air_pollution", self.base_url);
        let response: AirPollutionResponse = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .list
            .first()
            .map(|entry| AirQualityIndex::new(entry.main.aqi))
            .ok_or(AirQualityError::NoReading {
                lat: location.lat,
                lon: location.lon,
            })
    }
}

#[async_trait]
impl AirQualitySource for OpenWeatherClient {
    async fn current_aqi(&self, city: &str) -> Result<AirQualityIndex, AirQualityError> {
        let api_key = self.api_key.as_deref().ok_or(AirQualityError::NoApiKey)?;

        let location = self.geocode(city, api_key).await?;
        let aqi = self.pollution(&location, api_key).await?;

        debug!(city, lat = location.lat, lon = location.lon, aqi = aqi.value(), "fetched current AQI");
        Ok(aqi)
    }
}
