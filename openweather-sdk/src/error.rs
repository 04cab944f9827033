use thiserror::Error;

/// Failure taxonomy for SDK operations.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Caller passed an empty/blank API key or city.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider answered with a non-success status. `message` carries
    /// the provider's own explanation when its error body had one.
    #[error("API error: HTTP {status}{}", fmt_message(.message))]
    Upstream {
        status: u16,
        message: Option<String>,
    },

    /// The request could not complete at all (I/O failure, cancellation,
    /// undecodable success body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Client construction failed before any request was made.
    #[error("client construction failed: {0}")]
    Construction(String),
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_message_when_present() {
        let err = WeatherError::Upstream {
            status: 404,
            message: Some("city not found".to_string()),
        };
        assert_eq!(err.to_string(), "API error: HTTP 404: city not found");
    }

    #[test]
    fn upstream_display_omits_missing_message() {
        let err = WeatherError::Upstream {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: HTTP 502");
    }
}
