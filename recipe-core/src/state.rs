use reqwest::Client;
use tracing::info;

use crate::api::{build_client, RecipeApi};
use crate::budget::RequestBudget;
use crate::config::{AppConfig, FavoritesPersistence};
use crate::error::AppError;
use crate::favorites::{FavoriteItem, FavoritesStore};
use crate::fetch::Fetcher;
use crate::local_store::LocalStore;
use crate::recipe::{Recipe, RecipeList};
use crate::session::Session;

pub type RecipeFeed = Fetcher<RecipeList>;
pub type RecipeDetail = Fetcher<Recipe>;

/// Everything the presentation layer needs, owned in one place and passed
/// around by reference.
pub struct AppState {
    config: AppConfig,
    client: Client,
    api: RecipeApi,
    session: Session,
    favorites: FavoritesStore,
    budget: Option<RequestBudget>,
}

impl AppState {
    /// Opens the local store only when something needs it (persistent
    /// favorites or a request budget).
    pub async fn open(config: AppConfig) -> Result<Self, AppError> {
        let needs_store = config.favorites.persistence == FavoritesPersistence::Local
            || config.budget.limit.is_some();
        let store = if needs_store {
            let dir = config.storage_dir()?;
            LocalStore::load_from_dir(&dir).await
        } else {
            LocalStore::in_memory()
        };
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: AppConfig, store: LocalStore) -> Result<Self, AppError> {
        let client = build_client(&config.api)?;

        let favorites = match config.favorites.persistence {
            FavoritesPersistence::Local => FavoritesStore::persistent(store.clone()).await,
            FavoritesPersistence::Memory => FavoritesStore::in_memory(),
        };

        let budget = config
            .budget
            .limit
            .map(|limit| RequestBudget::new(store.clone(), limit, config.budget.reset));

        let credentials = config.auth.credentials();
        let session = if config.auth.signed_in_at_start {
            Session::signed_in(credentials)
        } else {
            Session::new(credentials)
        };

        info!(
            persistence = ?config.favorites.persistence,
            budget = ?config.budget.limit,
            "application state ready"
        );

        Ok(Self {
            api: RecipeApi::new(config.api.clone()),
            config,
            client,
            session,
            favorites,
            budget,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &RecipeApi {
        &self.api
    }

    pub fn budget(&self) -> Option<&RequestBudget> {
        self.budget.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn login(&mut self, email: &str, password: &str) -> bool {
        self.session.login(email, password)
    }

    pub async fn logout(&mut self) {
        self.session.logout();
        if self.config.favorites.clear_on_logout {
            self.favorites.clear().await;
        }
    }

    /// Read-only; mutations go through [`AppState::toggle_favorite`].
    pub async fn favorite_count(&self) -> usize {
        self.favorites.len().await
    }

    pub async fn is_favorite(&self, id: u64) -> bool {
        self.favorites.contains(id).await
    }

    pub async fn toggle_favorite(&self, recipe: &Recipe) -> Result<bool, AppError> {
        self.require_session()?;
        Ok(self.favorites.toggle(FavoriteItem::from(recipe)).await)
    }

    pub async fn list_favorites(&self) -> Result<Vec<FavoriteItem>, AppError> {
        self.require_session()?;
        Ok(self.favorites.list().await)
    }

    pub fn recipe_feed(&self) -> RecipeFeed {
        self.fetcher()
    }

    pub fn recipe_detail(&self) -> RecipeDetail {
        self.fetcher()
    }

    fn fetcher<T>(&self) -> Fetcher<T> {
        let fetcher = Fetcher::new(self.client.clone());
        match &self.budget {
            Some(budget) => fetcher.with_budget(budget.clone()),
            None => fetcher,
        }
    }

    fn require_session(&self) -> Result<(), AppError> {
        if self.session.is_connected() {
            Ok(())
        } else {
            Err(AppError::NotConnected)
        }
    }
}
