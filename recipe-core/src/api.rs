use reqwest::{redirect, Client, ClientBuilder};

use crate::config::ApiConfig;
use crate::fetch::FetchRequest;

pub const API_KEY_HEADER: &str = "x-rapidapi-key";
pub const API_HOST_HEADER: &str = "x-rapidapi-host";

pub fn build_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .timeout(config.request_timeout())
        .user_agent(concat!("recipe-browser/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Parameters of the recipe list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub from: u32,
    pub size: u32,
    pub query: Option<String>,
    pub tags: Option<String>,
}

impl ListQuery {
    pub fn page(from: u32, size: u32) -> Self {
        Self {
            from,
            size,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn next_page(&self) -> Self {
        Self {
            from: self.from.saturating_add(self.size),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipeApi {
    config: ApiConfig,
}

impl RecipeApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn first_page(&self) -> ListQuery {
        ListQuery::page(0, self.config.page_size)
    }

    pub fn list_request(&self, query: &ListQuery) -> FetchRequest {
        let mut request = FetchRequest::get(&self.config.list_url)
            .param("from", query.from)
            .param("size", query.size);
        if let Some(q) = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            request = request.param("q", q);
        }
        if let Some(tags) = query.tags.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            request = request.param("tags", tags);
        }
        self.authorize(request)
    }

    pub fn detail_request(&self, id: u64) -> FetchRequest {
        self.authorize(FetchRequest::get(&self.config.detail_url).param("id", id))
    }

    fn authorize(&self, mut request: FetchRequest) -> FetchRequest {
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key.clone());
        }
        if let Some(host) = &self.config.api_host {
            request = request.header(API_HOST_HEADER, host.clone());
        }
        request
    }
}
