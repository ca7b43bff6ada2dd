use anyhow::Context as _;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::StravaConfig;
use crate::model::ActivitySummary;
use crate::sources::{endpoint, read_success_body};
use crate::text::{format_date, format_duration};

const METERS_PER_MILE: f64 = 1609.344;
const ACTIVITIES_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Activity {
    name: String,
    #[serde(default)]
    sport_type: Option<String>,
    #[serde(default, rename = "type")]
    legacy_type: Option<String>,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    moving_time: u64,
    start_date: DateTime<Utc>,
    /// Wall-clock time at the activity's location, encoded with a `Z`.
    #[serde(default)]
    start_date_local: String,
    #[serde(default)]
    kilojoules: Option<f64>,
}

impl Activity {
    fn into_summary(self) -> ActivitySummary {
        let distance = if self.distance > 0.0 {
            format!("{:.1} miles", self.distance / METERS_PER_MILE)
        } else {
            String::new()
        };
        let local_day = self
            .start_date_local
            .get(..10)
            .map(str::to_owned)
            .unwrap_or_else(|| self.start_date.date_naive().to_string());

        ActivitySummary {
            name: self.name,
            activity_type: self.sport_type.or(self.legacy_type),
            distance,
            duration: format_duration(self.moving_time.saturating_mul(1000)),
            date: format_date(&local_day),
            output_kj: self.kilojoules.filter(|kj| *kj > 0.0),
        }
    }
}

/// Strava API calls made with a refresh-token grant.
pub struct StravaClient {
    client: reqwest::Client,
    config: StravaConfig,
    token: OnceCell<String>,
}

impl StravaClient {
    pub fn new(client: reqwest::Client, config: StravaConfig) -> Self {
        Self {
            client,
            config,
            token: OnceCell::new(),
        }
    }

    async fn access_token(&self) -> anyhow::Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let credentials = self
                    .config
                    .credentials
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("strava credentials are not configured"))?;
                let url = endpoint(&self.config.oauth_base_url, "oauth/token")?;
                let response = self
                    .client
                    .post(url.clone())
                    .form(&[
                        ("client_id", credentials.client_id.as_str()),
                        ("client_secret", credentials.client_secret.as_str()),
                        ("grant_type", "refresh_token"),
                        ("refresh_token", credentials.refresh_token.as_str()),
                    ])
                    .send()
                    .await
                    .with_context(|| format!("POST {url}"))?;
                let body = read_success_body(response, "strava token refresh").await?;
                let token: TokenResponse =
                    serde_json::from_str(&body).context("parse strava token response")?;
                anyhow::Ok(token.access_token)
            })
            .await?;
        Ok(token.as_str())
    }

    /// Most recent activity started within the configured window, or `None`
    /// when there is none or Strava is not connected.
    pub async fn latest_activity(&self) -> anyhow::Result<Option<ActivitySummary>> {
        if self.config.credentials.is_none() {
            return Ok(None);
        }
        let token = self.access_token().await.context("get strava access token")?;
        let url = endpoint(
            &self.config.api_base_url,
            &format!("athlete/activities?per_page={ACTIVITIES_PAGE_SIZE}"),
        )?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let body = read_success_body(response, "strava activities request").await?;
        let activities: Vec<Activity> =
            serde_json::from_str(&body).context("parse strava activities")?;

        let cutoff = Utc::now() - Duration::days(self.config.recent_days);
        let latest = activities
            .into_iter()
            .filter(|a| a.start_date >= cutoff)
            .max_by_key(|a| a.start_date);
        if latest.is_none() {
            tracing::debug!(recent_days = self.config.recent_days, "no recent strava activity");
        }
        Ok(latest.map(Activity::into_summary))
    }
}
