//! Cohere rerank client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{error_body, http_client};
use crate::config::RerankConfig;
use crate::error::{Error, Result};
use crate::providers::reranker::{RerankHit, RerankProvider};

/// Cohere rerank provider (rerank-english-v3.0)
pub struct CohereReranker {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CohereReranker {
    pub fn new(api_key: impl Into<String>, config: &RerankConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    #[serde(default)]
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[async_trait]
impl RerankProvider for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n,
        };

        let response = self
            .client
            .post(format!("{}/v2/rerank", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::rerank(format!("Cohere request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::rerank(format!(
                "Cohere rerank failed ({}): {}",
                status,
                error_body(response).await
            )));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::rerank(format!("Failed to parse Cohere response: {}", e)))?;

        let mut hits: Vec<RerankHit> = parsed
            .results
            .into_iter()
            .map(|r| RerankHit {
                index: r.index,
                relevance_score: r.relevance_score,
            })
            .collect();
        hits.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        Ok(hits)
    }

    fn name(&self) -> &str {
        "cohere"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reranker(server: &MockServer) -> CohereReranker {
        let config = RerankConfig {
            base_url: server.uri(),
            ..RerankConfig::default()
        };
        CohereReranker::new("co-key", &config).unwrap()
    }

    #[tokio::test]
    async fn test_rerank_request_and_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/rerank"))
            .and(header("Authorization", "Bearer co-key"))
            .and(body_json(json!({
                "model": "rerank-english-v3.0",
                "query": "capital of france",
                "documents": ["berlin", "paris", "rome"],
                "top_n": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "r1",
                "results": [
                    { "index": 2, "relevance_score": 0.2 },
                    { "index": 1, "relevance_score": 0.97 }
                ]
            })))
            .mount(&server)
            .await;

        let docs = vec!["berlin".to_string(), "paris".to_string(), "rome".to_string()];
        let hits = reranker(&server)
            .rerank("capital of france", &docs, 2)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[1].index, 2);
    }

    #[tokio::test]
    async fn test_rerank_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api token"))
            .mount(&server)
            .await;

        let err = reranker(&server)
            .rerank("q", &["doc".to_string()], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rerank(_)));
        assert!(err.to_string().contains("invalid api token"));
    }
}
