use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{error::HereError, model::WeatherRequest};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://weather.hereapi.com/v3/report";

/// Client for the HERE weather report endpoint.
#[derive(Debug, Clone)]
pub struct HereProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl HereProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherProvider for HereProvider {
    async fn weather_for_coordinates(&self, request: &WeatherRequest) -> Result<Value, HereError> {
        let location = format!("{},{}", request.latitude, request.longitude);

        debug!(product = %request.product, %location, "Requesting HERE weather report");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("products", request.product.api_name()),
                ("location", location.as_str()),
                ("lang", request.language.code()),
                ("units", request.units.as_str()),
                ("oneObservation", "true"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            HereError::MalformedPayload(format!("response is not valid JSON: {err}"))
        })
    }
}

fn classify_status(status: StatusCode, body: &str) -> HereError {
    let message = format!("HERE responded with status {status}: {}", truncate_body(body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HereError::Unauthorized(message),
        StatusCode::BAD_REQUEST => HereError::InvalidRequest(message),
        _ => HereError::Transport(message),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Language, WeatherProductType},
        units::UnitSystem,
    };
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    /// Answer a single HTTP request with `status` and `body`; yields the request head.
    async fn respond_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v3/report", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (url, rx)
    }

    fn daily_request() -> WeatherRequest {
        WeatherRequest {
            latitude: 40.79962,
            longitude: -73.970314,
            product: WeatherProductType::Forecast7DaysSimple,
            language: Language::German,
            units: UnitSystem::Imperial,
        }
    }

    #[tokio::test]
    async fn json_body_is_returned_with_query_parameters_sent() {
        let (url, head) = respond_once("200 OK", r#"{"dailyForecasts": []}"#).await;
        let provider = HereProvider::new("secret".into()).with_base_url(url);

        let payload = provider.weather_for_coordinates(&daily_request()).await.unwrap();
        assert_eq!(payload, serde_json::json!({"dailyForecasts": []}));

        let head = head.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("GET /v3/report?"));
        assert!(request_line.contains("products=forecast7daysSimple"));
        assert!(request_line.contains("lang=de-DE"));
        assert!(request_line.contains("units=imperial"));
        assert!(request_line.contains("oneObservation=true"));
        assert!(request_line.contains("apiKey=secret"));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed_payload() {
        let (url, _head) = respond_once("200 OK", "<html>maintenance</html>").await;
        let provider = HereProvider::new("secret".into()).with_base_url(url);

        let err = provider.weather_for_coordinates(&daily_request()).await.unwrap_err();
        assert!(matches!(err, HereError::MalformedPayload(_)));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        let (url, _head) =
            respond_once("401 Unauthorized", r#"{"error": "Unauthorized"}"#).await;
        let provider = HereProvider::new("wrong".into()).with_base_url(url);

        let err = provider.weather_for_coordinates(&daily_request()).await.unwrap_err();
        assert!(matches!(err, HereError::Unauthorized(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn bad_request_response_is_invalid_request() {
        let (url, _head) = respond_once("400 Bad Request", "location out of range").await;
        let provider = HereProvider::new("secret".into()).with_base_url(url);

        let err = provider.weather_for_coordinates(&daily_request()).await.unwrap_err();
        assert!(matches!(err, HereError::InvalidRequest(_)));
    }

    #[test]
    fn auth_statuses_are_unauthorized() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "denied"),
            HereError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "denied"),
            HereError::Unauthorized(_)
        ));
    }

    #[test]
    fn bad_request_is_invalid_request() {
        let err = classify_status(StatusCode::BAD_REQUEST, "location out of range");
        assert!(matches!(err, HereError::InvalidRequest(_)));
        assert!(err.to_string().contains("location out of range"));
    }

    #[test]
    fn other_statuses_are_transport_errors() {
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, ""),
            HereError::Transport(_)
        ));
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
