use anyhow::Context as _;

use crate::sheet::{Row, parse_sheet};

/// Downloads published spreadsheet tabs as CSV.
#[derive(Debug, Clone)]
pub struct SheetClient {
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        super::read_success_body(response, "sheet download").await
    }

    /// Fetches and tokenizes a tab; the header row is dropped.
    pub async fn fetch_rows(
        &self,
        url: &str,
        max_columns: Option<usize>,
    ) -> anyhow::Result<Vec<Row>> {
        let text = self.fetch_text(url).await?;
        let rows = parse_sheet(&text, max_columns);
        tracing::debug!(url, rows = rows.len(), "fetched sheet");
        Ok(rows)
    }
}
