use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Deserialize;
use sqlx::types::BigDecimal;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum CardApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Invalid response from card API: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Single card payload from the card-database API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCard {
    pub name: String,
    pub oracle_text: Option<String>,
    pub set_name: Option<String>,
    pub collector_number: Option<String>,
    pub prices: Option<ApiPrices>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPrices {
    pub usd: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    data: Vec<ApiCard>,
}

/// What the rest of the service needs to create a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLookup {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
}

impl ApiCard {
    fn into_lookup(self) -> CardLookup {
        let price = self
            .prices
            .and_then(|p| p.usd)
            .and_then(|usd| usd.parse::<BigDecimal>().ok())
            .unwrap_or_else(|| BigDecimal::from(0));
        CardLookup {
            name: self.name,
            description: self.oracle_text,
            price,
        }
    }
}

/// HTTP client for the public card-database API. Every request is preceded
/// by a fixed delay, the API's informal rate limit.
#[derive(Clone)]
pub struct CardApiClient {
    client: Client,
    base_url: String,
    request_delay: Duration,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl CardApiClient {
    pub fn new(base_url: String, request_delay_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        CardApiClient {
            client,
            base_url,
            request_delay: Duration::from_millis(request_delay_ms),
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    /// Looks a card up by fuzzy name; on a miss, falls back to the broader
    /// search endpoint and takes the first result. No retries.
    pub async fn lookup(&self, name: &str) -> Result<CardLookup, CardApiError> {
        match self.named_fuzzy(name).await {
            Ok(card) => Ok(card.into_lookup()),
            Err(CardApiError::CardNotFound(_)) => {
                let mut results = self.search(name).await?;
                if results.is_empty() {
                    return Err(CardApiError::CardNotFound(name.to_string()));
                }
                Ok(results.remove(0).into_lookup())
            }
            Err(e) => Err(e),
        }
    }

    async fn named_fuzzy(&self, name: &str) -> Result<ApiCard, CardApiError> {
        let url = Url::parse_with_params(
            &format!("{}/cards/named", self.base_url.trim_end_matches('/')),
            &[("fuzzy", name)],
        )?;

        tokio::time::sleep(self.request_delay).await;

        let client = self.client.clone();
        let lookup_name = name.to_string();
        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(url).send().await?;

                if response.status() == 404 {
                    return Err(CardApiError::CardNotFound(lookup_name));
                }
                if !response.status().is_success() {
                    return Err(CardApiError::InvalidResponse(format!(
                        "unexpected status {}",
                        response.status()
                    )));
                }

                let card = response.json::<ApiCard>().await?;
                Ok(card)
            })
            .await;

        match result {
            Ok(card) => Ok(card),
            Err(FailsafeError::Rejected) => Err(CardApiError::CircuitBreakerOpen(
                "card API circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<ApiCard>, CardApiError> {
        let url = Url::parse_with_params(
            &format!("{}/cards/search", self.base_url.trim_end_matches('/')),
            &[("q", query)],
        )?;

        tokio::time::sleep(self.request_delay).await;

        let client = self.client.clone();
        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(url).send().await?;

                if response.status() == 404 {
                    return Ok(Vec::new());
                }
                if !response.status().is_success() {
                    return Err(CardApiError::InvalidResponse(format!(
                        "unexpected status {}",
                        response.status()
                    )));
                }

                let body = response.json::<SearchResponse>().await?;
                Ok(body.data)
            })
            .await;

        match result {
            Ok(cards) => Ok(cards),
            Err(FailsafeError::Rejected) => Err(CardApiError::CircuitBreakerOpen(
                "card API circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const BOLT: &str = r#"{
        "name": "Lightning Bolt",
        "oracle_text": "Lightning Bolt deals 3 damage to any target.",
        "set_name": "Magic 2010",
        "collector_number": "146",
        "prices": { "usd": "2.50" }
    }"#;

    #[test]
    fn test_client_creation() {
        let client = CardApiClient::new("https://api.scryfall.com".to_string(), 150);
        assert_eq!(client.base_url, "https://api.scryfall.com");
        assert_eq!(client.circuit_state(), "closed");
    }

    #[test]
    fn missing_price_maps_to_zero() {
        let card: ApiCard = serde_json::from_str(
            r#"{"name": "Obscure Card", "oracle_text": null, "set_name": null,
                "collector_number": null, "prices": { "usd": null }}"#,
        )
        .unwrap();
        assert_eq!(card.into_lookup().price, BigDecimal::from(0));
    }

    #[test]
    fn usd_price_is_parsed() {
        let card: ApiCard = serde_json::from_str(BOLT).unwrap();
        let lookup = card.into_lookup();
        assert_eq!(lookup.price, BigDecimal::from_str("2.50").unwrap());
        assert_eq!(
            lookup.description.as_deref(),
            Some("Lightning Bolt deals 3 damage to any target.")
        );
    }

    #[tokio::test]
    async fn fuzzy_hit_short_circuits() {
        let mut server = mockito::Server::new_async().await;

        let named = server
            .mock("GET", "/cards/named")
            .match_query(mockito::Matcher::UrlEncoded(
                "fuzzy".into(),
                "Lightning Bolt".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BOLT)
            .create_async()
            .await;
        let search = server
            .mock("GET", "/cards/search")
            .expect(0)
            .create_async()
            .await;

        let client = CardApiClient::new(server.url(), 0);
        let lookup = client.lookup("Lightning Bolt").await.unwrap();

        assert_eq!(lookup.name, "Lightning Bolt");
        named.assert_async().await;
        search.assert_async().await;
    }

    #[tokio::test]
    async fn fuzzy_miss_falls_back_to_search() {
        let mut server = mockito::Server::new_async().await;

        let _named = server
            .mock("GET", "/cards/named")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let _search = server
            .mock("GET", "/cards/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data": [{}]}}"#, BOLT))
            .create_async()
            .await;

        let client = CardApiClient::new(server.url(), 0);
        let lookup = client.lookup("Lighting Bolt").await.unwrap();

        assert_eq!(lookup.name, "Lightning Bolt");
    }

    #[tokio::test]
    async fn both_misses_yield_not_found() {
        let mut server = mockito::Server::new_async().await;

        let _named = server
            .mock("GET", "/cards/named")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let _search = server
            .mock("GET", "/cards/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let client = CardApiClient::new(server.url(), 0);
        let result = client.lookup("No Such Card").await;

        assert!(matches!(result, Err(CardApiError::CardNotFound(_))));
    }
}
