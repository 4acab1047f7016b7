use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::*;
use crate::error::DashboardError;
use crate::models::*;
use crate::session::SessionStore;

/// Backend operations a bot panel depends on.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn competitors(&self) -> Result<Vec<Competitor>, DashboardError>;

    async fn competitor_vessels(
        &self,
        competitor_name: &str,
    ) -> Result<Vec<CompetitorVessel>, DashboardError>;

    async fn bot_status(&self) -> Result<BotStatusResponse, DashboardError>;

    async fn daily_status(&self, bot_id: u8) -> Result<DailyStatus, DashboardError>;

    async fn start_bot(&self) -> Result<BotActionResponse, DashboardError>;

    async fn stop_bot(&self) -> Result<BotActionResponse, DashboardError>;

    async fn compare_prices(
        &self,
        query: &ComparisonQuery,
    ) -> Result<Vec<ComparisonRow>, DashboardError>;
}

/// Per-request options merged into an authenticated call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }
}

/// HTTP client for the pricing backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: Url, session: SessionStore) -> Result<Self, DashboardError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Join an API path onto the base URL, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DashboardError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Exchange credentials for an access token and store it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DashboardError> {
        let url = self.endpoint(LOGIN_PATH, &[])?;
        let resp = self
            .http
            .post(url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Login rejected for {}", username);
            return Err(DashboardError::InvalidCredentials);
        }
        if !status.is_success() {
            warn!("Login failed with status {}", status);
            return Err(DashboardError::LoginFailed);
        }

        let body = resp.text().await?;
        let login: LoginResponse = decode(&url, &body)?;
        self.session.set_auth_token(&login.access_token)?;
        info!("Logged in as {}", username);
        Ok(login.access_token)
    }

    /// Issue a request carrying the session's bearer token and decode the JSON reply.
    ///
    /// Caller headers are kept unless they collide with `Authorization` or
    /// `Content-Type`, which are always overwritten.
    pub async fn fetch_with_auth<T: DeserializeOwned>(
        &self,
        url: Url,
        options: RequestOptions,
    ) -> Result<T, DashboardError> {
        let token = self
            .session
            .get_auth_token()
            .ok_or(DashboardError::NotAuthenticated)?;

        let mut headers = options.headers;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| DashboardError::NotAuthenticated)?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("{} {}", options.method, url);
        let mut request = self
            .http
            .request(options.method, url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::RequestFailed(status));
        }

        let body = resp.text().await?;
        decode(&url, &body)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DashboardError> {
        let url = self.endpoint(path, query)?;
        self.fetch_with_auth(url, RequestOptions::default()).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let url = self.endpoint(path, &[])?;
        self.fetch_with_auth(url, RequestOptions::post()).await
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn competitors(&self) -> Result<Vec<Competitor>, DashboardError> {
        self.get(COMPETITORS_PATH, &[]).await
    }

    async fn competitor_vessels(
        &self,
        competitor_name: &str,
    ) -> Result<Vec<CompetitorVessel>, DashboardError> {
        let resp: CompetitorVesselsResponse = self
            .get(
                COMPETITOR_VESSELS_PATH,
                &[("competitor_name", competitor_name)],
            )
            .await?;
        Ok(resp.yachts)
    }

    async fn bot_status(&self) -> Result<BotStatusResponse, DashboardError> {
        self.get(BOT_STATUS_PATH, &[]).await
    }

    async fn daily_status(&self, bot_id: u8) -> Result<DailyStatus, DashboardError> {
        let bot_id = bot_id.to_string();
        self.get(BOT_DAILY_STATUS_PATH, &[("bot_id", bot_id.as_str())])
            .await
    }

    async fn start_bot(&self) -> Result<BotActionResponse, DashboardError> {
        self.post(BOT_START_PATH).await
    }

    async fn stop_bot(&self) -> Result<BotActionResponse, DashboardError> {
        self.post(BOT_STOP_PATH).await
    }

    async fn compare_prices(
        &self,
        query: &ComparisonQuery,
    ) -> Result<Vec<ComparisonRow>, DashboardError> {
        let pairs = query.query_pairs();
        let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get(PRICE_COMPARE_PATH, &borrowed).await
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, DashboardError> {
    serde_json::from_str(body).map_err(|source| DashboardError::Decode {
        endpoint: url.path().to_string(),
        source,
    })
}
