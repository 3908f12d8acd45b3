use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::BudgetReset;
use crate::error::FetchError;
use crate::local_store::LocalStore;

pub const REQUEST_COUNT_KEY: &str = "request_count";
pub const REQUEST_COUNT_DAY_KEY: &str = "request_count_day";

/// Caps the number of outbound API calls with a counter kept in the local
/// store, so the count survives restarts. Clones share the same counter.
#[derive(Debug, Clone)]
pub struct RequestBudget {
    store: LocalStore,
    limit: u32,
    reset: BudgetReset,
    lock: Arc<Mutex<()>>,
}

impl RequestBudget {
    pub fn new(store: LocalStore, limit: u32, reset: BudgetReset) -> Self {
        Self {
            store,
            limit,
            reset,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn try_consume(&self) -> Result<u32, FetchError> {
        self.try_consume_on(Utc::now().date_naive()).await
    }

    /// Counts one call made on `today` and returns how many calls remain.
    pub async fn try_consume_on(&self, today: NaiveDate) -> Result<u32, FetchError> {
        let _guard = self.lock.lock().await;
        let used = self.current_count(today).await;
        if used >= self.limit {
            warn!(limit = self.limit, "request budget exhausted");
            return Err(FetchError::BudgetExceeded { limit: self.limit });
        }
        let used = used + 1;
        self.store.set(REQUEST_COUNT_KEY, used.to_string()).await;
        if self.reset == BudgetReset::Daily {
            self.store
                .set(REQUEST_COUNT_DAY_KEY, today.format("%Y-%m-%d").to_string())
                .await;
        }
        debug!(used, limit = self.limit, "request budget consumed");
        Ok(self.limit - used)
    }

    pub async fn used(&self) -> u32 {
        self.used_on(Utc::now().date_naive()).await
    }

    pub async fn used_on(&self, today: NaiveDate) -> u32 {
        let _guard = self.lock.lock().await;
        self.current_count(today).await
    }

    pub async fn reset(&self) {
        let _guard = self.lock.lock().await;
        self.store.remove(REQUEST_COUNT_KEY).await;
        self.store.remove(REQUEST_COUNT_DAY_KEY).await;
    }

    async fn current_count(&self, today: NaiveDate) -> u32 {
        if self.reset == BudgetReset::Daily {
            let day = self
                .store
                .get(REQUEST_COUNT_DAY_KEY)
                .await
                .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok());
            if day != Some(today) {
                return 0;
            }
        }
        match self.store.get(REQUEST_COUNT_KEY).await {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|e| {
                warn!(error = %e, "stored request count is not a number, treating as 0");
                0
            }),
            None => 0,
        }
    }
}
