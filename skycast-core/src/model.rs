use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, de::Error as _};
use serde_json::Value;

/// Units system requested when the caller does not name one.
pub const DEFAULT_UNITS: &str = "metric";

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// One of the three supported lookup shapes.
///
/// Values are forwarded to the provider verbatim; nothing is validated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    ByCity {
        city: String,
        units: String,
    },
    ByPostalCode {
        postal_code: String,
        country_code: String,
        units: String,
    },
    ByCoordinates {
        latitude: String,
        longitude: String,
        units: String,
    },
}

impl Query {
    pub fn by_city(city: impl Into<String>) -> Self {
        Query::ByCity {
            city: city.into(),
            units: DEFAULT_UNITS.to_string(),
        }
    }

    pub fn by_postal_code(postal_code: impl Into<String>, country_code: impl Into<String>) -> Self {
        Query::ByPostalCode {
            postal_code: postal_code.into(),
            country_code: country_code.into(),
            units: DEFAULT_UNITS.to_string(),
        }
    }

    pub fn by_coordinates(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Query::ByCoordinates {
            latitude: latitude.into(),
            longitude: longitude.into(),
            units: DEFAULT_UNITS.to_string(),
        }
    }

    /// Replace the units system; `None` keeps the current one.
    pub fn with_units(mut self, units: Option<&str>) -> Self {
        if let Some(new_units) = units {
            match &mut self {
                Query::ByCity { units, .. }
                | Query::ByPostalCode { units, .. }
                | Query::ByCoordinates { units, .. } => *units = new_units.to_string(),
            }
        }
        self
    }

    pub fn units(&self) -> &str {
        match self {
            Query::ByCity { units, .. }
            | Query::ByPostalCode { units, .. }
            | Query::ByCoordinates { units, .. } => units,
        }
    }

    /// Human-readable lookup mode, used in diagnostics.
    pub fn mode(&self) -> &'static str {
        match self {
            Query::ByCity { .. } => "city",
            Query::ByPostalCode { .. } => "postal code",
            Query::ByCoordinates { .. } => "coordinates",
        }
    }

    /// Location parameters for this lookup, without credential and units.
    pub(crate) fn location_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Query::ByCity { city, .. } => vec![("q", city.clone())],
            Query::ByPostalCode {
                postal_code,
                country_code,
                ..
            } => vec![("zip", format!("{postal_code},{country_code}"))],
            Query::ByCoordinates {
                latitude,
                longitude,
                ..
            } => vec![("lat", latitude.clone()), ("lon", longitude.clone())],
        }
    }
}

/// Display-facing projection of a current-weather payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub id: Option<i64>,
    pub icon_url: Option<String>,
    pub temperature: f64,
    pub city: String,
    pub country: String,
    pub humidity: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    /// Local time at the location, `HH:MM`.
    pub sunrise_time: String,
    pub sunset_time: String,
}

impl WeatherReading {
    /// Map a raw provider payload onto the display model.
    pub fn from_payload(payload: &Value) -> serde_json::Result<Self> {
        let raw = OwCurrent::deserialize(payload)?;
        let offset = raw.timezone.unwrap_or(0);

        let sunrise_time = local_time(raw.sys.sunrise, offset)?;
        let sunset_time = local_time(raw.sys.sunset, offset)?;

        let icon_url = raw
            .weather
            .first()
            .map(|w| format!("{ICON_BASE_URL}/{}@2x.png", w.icon));

        Ok(WeatherReading {
            id: raw.id,
            icon_url,
            temperature: raw.main.temp,
            city: raw.name,
            country: raw.sys.country.unwrap_or_default(),
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_speed: raw.wind.speed,
            sunrise_time,
            sunset_time,
        })
    }
}

fn local_time(ts: i64, offset_secs: i32) -> serde_json::Result<String> {
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        serde_json::Error::custom(format!("invalid timezone offset {offset_secs}"))
    })?;
    let utc = DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| serde_json::Error::custom(format!("invalid timestamp {ts}")))?;

    Ok(utc.with_timezone(&offset).format("%H:%M").to_string())
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    id: Option<i64>,
    name: String,
    timezone: Option<i32>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}
