use serde::{Deserialize, Serialize};

/// Canonical weather report returned to callers.
///
/// Field names and nesting are the wire contract of the SDK: serializing a
/// report yields exactly this JSON shape. `weather` is omitted from the
/// output entirely when the provider supplied no weather array entry; all
/// other fields fall back to zero values when absent upstream, and `name`
/// falls back to the queried city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Condition>,
    pub temperature: Temperature,
    pub visibility: i64,
    pub wind: Wind,
    pub datetime: i64,
    pub sys: SunTimes,
    pub timezone: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub temp: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

// Raw OpenWeather payload shapes. Every field defaults so a sparse
// payload still normalizes instead of failing.

#[derive(Debug, Default, Deserialize)]
struct OwResponse {
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    visibility: i64,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    dt: i64,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    timezone: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

/// Map a raw provider payload into the canonical report.
///
/// Pure and infallible: missing fields take their defaults, and a payload
/// that cannot be read at all yields an all-default report. Only the
/// transport layer produces errors for this pipeline.
pub fn normalize(raw: serde_json::Value, city: &str) -> WeatherReport {
    let raw: OwResponse = serde_json::from_value(raw).unwrap_or_default();

    let weather = raw.weather.into_iter().next().map(|w| Condition {
        main: w.main,
        description: w.description,
    });

    WeatherReport {
        weather,
        temperature: Temperature {
            temp: raw.main.temp,
            feels_like: raw.main.feels_like,
        },
        visibility: raw.visibility,
        wind: Wind { speed: raw.wind.speed },
        datetime: raw.dt,
        sys: SunTimes {
            sunrise: raw.sys.sunrise,
            sunset: raw.sys.sunset,
        },
        timezone: raw.timezone,
        name: if raw.name.is_empty() {
            city.to_string()
        } else {
            raw.name
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_payload_maps_field_for_field() {
        let raw = json!({
            "weather": [{"main": "Clear", "description": "clear sky"}],
            "main": {"temp": 280.1, "feels_like": 278.0},
            "visibility": 10000,
            "wind": {"speed": 3.6},
            "dt": 1_690_000_000,
            "sys": {"sunrise": 1_689_990_000, "sunset": 1_690_030_000},
            "timezone": 3600,
            "name": "Test"
        });

        let report = normalize(raw, "Queried");

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "weather": {"main": "Clear", "description": "clear sky"},
                "temperature": {"temp": 280.1, "feels_like": 278.0},
                "visibility": 10000,
                "wind": {"speed": 3.6},
                "datetime": 1_690_000_000,
                "sys": {"sunrise": 1_689_990_000, "sunset": 1_690_030_000},
                "timezone": 3600,
                "name": "Test"
            })
        );
    }

    #[test]
    fn empty_weather_array_omits_weather_key() {
        let raw = json!({
            "weather": [],
            "main": {"temp": 280.1, "feels_like": 278.0},
            "name": "Test"
        });

        let report = normalize(raw, "Test");
        assert!(report.weather.is_none());

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("weather").is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let report = normalize(json!({}), "Lisbon");

        assert!(report.weather.is_none());
        assert_eq!(report.temperature.temp, 0.0);
        assert_eq!(report.temperature.feels_like, 0.0);
        assert_eq!(report.visibility, 0);
        assert_eq!(report.wind.speed, 0.0);
        assert_eq!(report.datetime, 0);
        assert_eq!(report.sys.sunrise, 0);
        assert_eq!(report.sys.sunset, 0);
        assert_eq!(report.timezone, 0);
    }

    #[test]
    fn name_falls_back_to_queried_city() {
        let report = normalize(json!({"visibility": 250}), "Porto");
        assert_eq!(report.name, "Porto");
        assert_eq!(report.visibility, 250);
    }

    #[test]
    fn unreadable_payload_normalizes_to_defaults() {
        let report = normalize(json!("not an object"), "Kyiv");
        assert_eq!(report.name, "Kyiv");
        assert_eq!(report.datetime, 0);
    }
}
