pub mod api;
pub mod budget;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod local_store;
pub mod logging;
pub mod recipe;
pub mod session;
pub mod state;

pub use api::{build_client, ListQuery, RecipeApi};
pub use budget::RequestBudget;
pub use config::{AppConfig, BudgetReset, FavoritesPersistence};
pub use error::{AppError, ConfigError, FetchError};
pub use favorites::{FavoriteItem, FavoritesStore};
pub use fetch::{FetchRequest, FetchState, Fetcher};
pub use local_store::LocalStore;
pub use recipe::{filter_recipes, Recipe, RecipeList};
pub use session::{Credentials, Session};
pub use state::{AppState, RecipeDetail, RecipeFeed};
