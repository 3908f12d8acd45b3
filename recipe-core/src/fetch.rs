use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::budget::RequestBudget;
use crate::error::FetchError;

/// A GET request: base address, ordered query parameters and headers.
/// Two requests target the same resource when address and parameters match;
/// headers are not part of that identity.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("FetchRequest")
            .field("url", &self.url)
            .field("params", &self.params)
            .field("headers", &header_names)
            .finish()
    }
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn same_target(&self, other: &FetchRequest) -> bool {
        self.url == other.url && self.params == other.params
    }

    pub fn full_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.url)?;
        if !self.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        !self.loading && self.data.is_none() && self.error.is_none()
    }
}

/// Reusable request/response/loading-state holder for one consumer.
///
/// At most one request is in flight. Starting another one, calling
/// [`Fetcher::cancel`] or dropping the fetcher aborts the running task, and a
/// response from a superseded task is never written to the state.
pub struct Fetcher<T> {
    client: Client,
    budget: Option<RequestBudget>,
    state: Arc<watch::Sender<FetchState<T>>>,
    generation: Arc<AtomicU64>,
    current: Option<FetchRequest>,
    inflight: Option<JoinHandle<()>>,
}

impl<T> Fetcher<T> {
    pub fn new(client: Client) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            client,
            budget: None,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            current: None,
            inflight: None,
        }
    }

    pub fn with_budget(mut self, budget: RequestBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    pub fn current_request(&self) -> Option<&FetchRequest> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Stops the in-flight request, if any. The state is left exactly as it
    /// is; the next [`Fetcher::request`] starts over even for the same target.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.inflight.take() {
            if !handle.is_finished() {
                debug!("cancelling in-flight request");
            }
            handle.abort();
        }
        self.current = None;
    }
}

impl<T> Fetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// Waits until the current attempt leaves the loading state.
    pub async fn settled(&self) -> FetchState<T>
    where
        T: Clone,
    {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.state.borrow().clone(),
        }
    }

    /// Points the fetcher at `request`. Asking again for the current target
    /// does nothing, whether it is in flight, succeeded or failed; use
    /// [`Fetcher::reload`] to force another attempt.
    pub async fn request(&mut self, request: FetchRequest) {
        if let Some(current) = &self.current {
            if current.same_target(&request) {
                debug!(url = %request.url, "request unchanged, keeping current state");
                return;
            }
        }
        self.start(request).await;
    }

    pub async fn reload(&mut self) {
        if let Some(request) = self.current.clone() {
            self.start(request).await;
        }
    }

    async fn start(&mut self, request: FetchRequest) {
        self.cancel();
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.current = Some(request.clone());

        if let Some(budget) = &self.budget {
            if let Err(err) = budget.try_consume().await {
                publish(&self.state, &self.generation, ticket, Err(err));
                return;
            }
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let client = self.client.clone();
        let state = self.state.clone();
        let generation = self.generation.clone();
        self.inflight = Some(tokio::spawn(async move {
            let outcome = execute::<T>(&client, &request).await;
            publish(&state, &generation, ticket, outcome);
        }));
    }
}

impl<T> Drop for Fetcher<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn publish<T>(
    state: &watch::Sender<FetchState<T>>,
    generation: &AtomicU64,
    ticket: u64,
    outcome: Result<T, FetchError>,
) {
    state.send_if_modified(|s| {
        if generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded response");
            return false;
        }
        match outcome {
            Ok(data) => {
                s.data = Some(data);
                s.error = None;
            }
            Err(err) => {
                warn!(error = %err, "fetch failed");
                s.data = None;
                s.error = Some(err.to_string());
            }
        }
        s.loading = false;
        true
    });
}

async fn execute<T: DeserializeOwned>(
    client: &Client,
    request: &FetchRequest,
) -> Result<T, FetchError> {
    let url = request.full_url()?;
    debug!(url = %url, "sending request");
    let mut builder = client.get(url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
