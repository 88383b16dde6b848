//! Location lookup (geocoding).
//!
//! Resolves a free-text query such as "Space Needle" to a geographic
//! coordinate, so the viewer can be centered on a named place.
//!
//! # URL Pattern
//!
//! `https://dev.virtualearth.net/REST/v1/Locations?o=json&q={query}&key={key}`

use serde::Deserialize;

use crate::coord::GeoCoordinate;
use crate::provider::{AsyncHttpClient, FetchError};

/// Base URL for the locations endpoint.
const LOCATIONS_BASE_URL: &str = "https://dev.virtualearth.net/REST/v1/Locations";

/// A resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Display name returned by the service.
    pub name: Option<String>,
    /// Coordinate of the location.
    pub coordinate: GeoCoordinate,
    /// Confidence reported by the service ("High", "Medium", "Low").
    pub confidence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    #[serde(rename = "statusCode", default)]
    status_code: u16,
    #[serde(rename = "resourceSets", default)]
    resource_sets: Vec<ResourceSet>,
}

#[derive(Debug, Deserialize)]
struct ResourceSet {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    name: Option<String>,
    point: Option<Point>,
    confidence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Point {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Parse a locations response body.
///
/// Returns the first resource carrying a valid `[latitude, longitude]`
/// point, or `None` when the service found nothing.
pub fn parse_locations(body: &[u8]) -> Result<Option<Location>, FetchError> {
    let response: LocationResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Json(e.to_string()))?;

    if response.status_code != 0 && response.status_code != 200 {
        return Err(FetchError::Http(format!(
            "Locations service returned status {}",
            response.status_code
        )));
    }

    let location = response
        .resource_sets
        .into_iter()
        .flat_map(|set| set.resources)
        .find_map(|resource| {
            let point = resource.point?;
            let (lat, lon) = match point.coordinates.as_slice() {
                [lat, lon, ..] => (*lat, *lon),
                _ => return None,
            };
            let coordinate = GeoCoordinate::try_new(lat, lon).ok()?;
            Some(Location {
                name: resource.name,
                coordinate,
                confidence: resource.confidence,
            })
        });

    Ok(location)
}

/// Client for the locations endpoint.
pub struct LocationClient<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
}

impl<C: AsyncHttpClient> LocationClient<C> {
    /// Creates a new client; the API key must not be empty.
    pub fn new(http_client: C, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetchError::MissingApiKey);
        }
        Ok(Self {
            http_client,
            api_key,
        })
    }

    fn build_url(&self, query: &str) -> Result<String, FetchError> {
        let url = reqwest::Url::parse_with_params(
            LOCATIONS_BASE_URL,
            &[("o", "json"), ("q", query), ("key", self.api_key.as_str())],
        )
        .map_err(|e| FetchError::Http(format!("Invalid locations URL: {}", e)))?;
        Ok(url.into())
    }

    /// Resolve a free-text query to the best matching location.
    pub async fn resolve(&self, query: &str) -> Result<Option<Location>, FetchError> {
        let url = self.build_url(query)?;
        let body = self.http_client.get(&url).await?;
        let location = parse_locations(&body)?;

        match &location {
            Some(found) => tracing::debug!(
                query,
                coordinate = %found.coordinate,
                name = ?found.name,
                "Location resolved"
            ),
            None => tracing::debug!(query, "Location query returned no results"),
        }

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    const SEATTLE_RESPONSE: &str = r#"{
        "authenticationResultCode": "ValidCredentials",
        "statusCode": 200,
        "statusDescription": "OK",
        "resourceSets": [{
            "estimatedTotal": 1,
            "resources": [{
                "__type": "Location:http://schemas.microsoft.com/search/local/ws/rest/v1",
                "name": "Seattle, WA",
                "point": { "type": "Point", "coordinates": [47.60357, -122.32945] },
                "confidence": "High",
                "entityType": "PopulatedPlace"
            }]
        }]
    }"#;

    const EMPTY_RESPONSE: &str = r#"{
        "statusCode": 200,
        "resourceSets": [{ "estimatedTotal": 0, "resources": [] }]
    }"#;

    #[test]
    fn test_parse_first_location() {
        let location = parse_locations(SEATTLE_RESPONSE.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(location.name.as_deref(), Some("Seattle, WA"));
        assert_eq!(location.confidence.as_deref(), Some("High"));
        assert_eq!(location.coordinate.latitude(), 47.60357);
        assert_eq!(location.coordinate.longitude(), -122.32945);
    }

    #[test]
    fn test_parse_empty_result() {
        assert_eq!(parse_locations(EMPTY_RESPONSE.as_bytes()).unwrap(), None);
    }

    #[test]
    fn test_parse_skips_resources_without_point() {
        let body = r#"{
            "statusCode": 200,
            "resourceSets": [{ "resources": [
                { "name": "nowhere" },
                { "name": "somewhere", "point": { "coordinates": [10.0, 20.0] } }
            ]}]
        }"#;
        let location = parse_locations(body.as_bytes()).unwrap().unwrap();
        assert_eq!(location.name.as_deref(), Some("somewhere"));
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{ "statusCode": 401, "resourceSets": [] }"#;
        assert!(matches!(
            parse_locations(body.as_bytes()),
            Err(FetchError::Http(_))
        ));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_locations(b"not json"),
            Err(FetchError::Json(_))
        ));
    }

    #[test]
    fn test_url_encodes_query() {
        let client = LocationClient::new(
            MockAsyncHttpClient {
                response: Ok(vec![]),
            },
            "k",
        )
        .unwrap();
        let url = client.build_url("Space Needle & more").unwrap();
        assert!(url.starts_with("https://dev.virtualearth.net/REST/v1/Locations?o=json&q="));
        assert!(url.contains("Space+Needle+%26+more"));
        assert!(url.ends_with("&key=k"));
    }

    #[tokio::test]
    async fn test_resolve_through_client() {
        let client = LocationClient::new(
            MockAsyncHttpClient {
                response: Ok(SEATTLE_RESPONSE.as_bytes().to_vec()),
            },
            "k",
        )
        .unwrap();
        let location = client.resolve("Seattle").await.unwrap().unwrap();
        assert!((location.coordinate.latitude() - 47.60357).abs() < 1e-9);
    }
}
