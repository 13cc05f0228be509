//! Code for talking to the GDC data portal REST API.
//!
//! The GDC exposes file discovery via the `/files` endpoint (with a JSON
//! filter expression passed as a query parameter) and file contents via
//! `/data/{file_id}`.  See <https://docs.gdc.cancer.gov/API/>.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod download_clinical;
pub mod download_snv;

/// Base URL of the production GDC API.
pub const GDC_API_URL: &str = "https://api.gdc.cancer.gov";

/// One node of a GDC filter expression.
///
/// Filters are a tree of operator nodes; leaves compare a field against a
/// value, inner nodes combine sub-filters with boolean operators.
#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    /// The operator, e.g. `=` or `and`.
    pub op: &'static str,
    /// The operator content (leaf comparison or sub-filters).
    pub content: FilterContent,
}

/// Content of a filter node.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FilterContent {
    /// Leaf comparison of a field against a value.
    Comparison {
        /// Field name, e.g. `cases.project.project_id`.
        field: String,
        /// Value to compare against, `*` wildcards are allowed.
        value: String,
    },
    /// Sub-filters of a boolean operator.
    Group(Vec<Filter>),
}

impl Filter {
    /// Construct a `field = value` comparison.
    pub fn eq(field: &str, value: &str) -> Self {
        Self {
            op: "=",
            content: FilterContent::Comparison {
                field: field.to_string(),
                value: value.to_string(),
            },
        }
    }

    /// Construct a conjunction of the given filters.
    pub fn and(filters: Vec<Filter>) -> Self {
        Self {
            op: "and",
            content: FilterContent::Group(filters),
        }
    }
}

/// Case information as returned within a file hit.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseHit {
    /// The case submitter ID, e.g. `TCGA-2J-AAB1`.
    pub submitter_id: String,
}

/// One hit as returned by the `/files` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FileHit {
    /// UUID of the file, used for download via `/data/{file_id}`.
    pub file_id: String,
    /// Name of the file as stored in the GDC.
    pub file_name: String,
    /// Cases the file belongs to (only present when requested via `fields`).
    #[serde(default)]
    pub cases: Vec<CaseHit>,
}

/// Envelope of the `/files` endpoint response.
#[derive(Debug, Deserialize)]
struct FilesResponse {
    data: FilesData,
}

/// Payload of the `/files` endpoint response.
#[derive(Debug, Deserialize)]
struct FilesData {
    hits: Vec<FileHit>,
}

/// Client for the GDC REST API with simple exponential-backoff retries.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client.
    http: reqwest::Client,
    /// Base URL of the API, points at the production GDC by default.
    base_url: String,
    /// Number of retries after a failed request.
    max_retries: u32,
    /// Delay before the first retry; doubled after each attempt.
    initial_backoff: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(GDC_API_URL, 3, Duration::from_secs(1))
    }
}

impl Client {
    /// Construct a new client against `base_url`.
    pub fn new(base_url: &str, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            initial_backoff,
        }
    }

    /// Perform a GET with retries, returning the successful response.
    async fn get_with_retry(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;
        loop {
            let result = self.http.get(url).query(params).send().await;
            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if attempt >= self.max_retries => {
                    anyhow::bail!(
                        "GET {} failed with status {} after {} attempts",
                        url,
                        response.status(),
                        attempt + 1
                    );
                }
                Ok(response) => {
                    tracing::warn!(
                        "GET {} returned status {}, retrying in {:?}",
                        url,
                        response.status(),
                        backoff
                    );
                }
                Err(e) if attempt >= self.max_retries => {
                    return Err(anyhow::anyhow!(
                        "GET {} failed after {} attempts: {}",
                        url,
                        attempt + 1,
                        e
                    ));
                }
                Err(e) => {
                    tracing::warn!("GET {} failed ({}), retrying in {:?}", url, e, backoff);
                }
            }
            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }

    /// Query the `/files` endpoint and return the matching hits.
    ///
    /// `fields` is the comma-separated list of fields to return per hit and
    /// `size` the maximal number of hits.
    pub async fn query_files(
        &self,
        filter: &Filter,
        fields: &str,
        size: usize,
    ) -> Result<Vec<FileHit>, anyhow::Error> {
        let url = format!("{}/files", self.base_url);
        let filters = serde_json::to_string(filter)?;
        let size = size.to_string();
        let params = [
            ("filters", filters.as_str()),
            ("fields", fields),
            ("format", "JSON"),
            ("size", size.as_str()),
        ];

        let response = self.get_with_retry(&url, &params).await?;
        let response: FilesResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("could not decode /files response: {}", e))?;

        Ok(response.data.hits)
    }

    /// Download the contents of the file with the given UUID.
    pub async fn fetch_data(&self, file_id: &str) -> Result<Vec<u8>, anyhow::Error> {
        let url = format!("{}/data/{}", self.base_url, file_id);
        let response = self.get_with_retry(&url, &[]).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("could not read body of {}: {}", url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Build a current-thread tokio runtime for driving the async client from
/// the synchronous sub commands.
pub fn runtime() -> Result<tokio::runtime::Runtime, anyhow::Error> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("could not build tokio runtime: {}", e))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_eq_serialization() -> Result<(), anyhow::Error> {
        let filter = super::Filter::eq("data_type", "Masked Somatic Mutation");

        let json = serde_json::to_value(&filter)?;
        assert_eq!(
            serde_json::json!({
                "op": "=",
                "content": {
                    "field": "data_type",
                    "value": "Masked Somatic Mutation"
                }
            }),
            json
        );

        Ok(())
    }

    #[test]
    fn filter_and_serialization() -> Result<(), anyhow::Error> {
        let filter = super::Filter::and(vec![
            super::Filter::eq("cases.project.project_id", "TCGA-PAAD"),
            super::Filter::eq("file_name", "*masked.maf.gz*"),
        ]);

        let json = serde_json::to_value(&filter)?;
        assert_eq!(
            serde_json::json!({
                "op": "and",
                "content": [
                    {
                        "op": "=",
                        "content": {
                            "field": "cases.project.project_id",
                            "value": "TCGA-PAAD"
                        }
                    },
                    {
                        "op": "=",
                        "content": {
                            "field": "file_name",
                            "value": "*masked.maf.gz*"
                        }
                    }
                ]
            }),
            json
        );

        Ok(())
    }

    #[test]
    fn file_hit_deserialization() -> Result<(), anyhow::Error> {
        let payload = r#"
        {
            "data": {
                "hits": [
                    {
                        "file_id": "0001-0002",
                        "file_name": "x.maf.gz",
                        "cases": [{"submitter_id": "TCGA-2J-AAB1"}]
                    },
                    {
                        "file_id": "0003-0004",
                        "file_name": "clinical_patient_paad.txt"
                    }
                ]
            }
        }
        "#;

        let response: super::FilesResponse = serde_json::from_str(payload)?;
        assert_eq!(2, response.data.hits.len());
        assert_eq!("0001-0002", response.data.hits[0].file_id);
        assert_eq!("TCGA-2J-AAB1", response.data.hits[0].cases[0].submitter_id);
        assert!(response.data.hits[1].cases.is_empty());

        Ok(())
    }
}
