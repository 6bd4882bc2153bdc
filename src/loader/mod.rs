//! Cache-or-load: render a dataset from local storage when we have it, fetch
//! it when we don't, and keep the stored copy fresh for the next visit.

pub mod error;
pub mod fetch;
pub mod storage;

pub use error::LoadError;
pub use fetch::{BrowserFetcher, Fetcher};
pub use storage::{browser_store, KeyValueStore, LocalStorage, MemoryStore};

use serde::de::DeserializeOwned;
use web_sys::Element;

use crate::content::dom::DomContainer;
use crate::content::{Charity, Container, Dataset, DatasetConfig, Job, Mission, School, Section};

/// How a single `cache_or_load` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rendered from the stored copy. `refreshed` says whether the background
    /// fetch managed to replace it.
    FromCache { refreshed: bool },
    /// Nothing stored; rendered from the network and stored.
    Fetched,
    /// Nothing stored and the fetch failed; nothing was rendered.
    Failed(LoadError),
}

/// Fetches `locator` and decodes it as `T`.
///
/// Returns the value alongside its canonical serialization, which is what
/// goes into the store.
async fn fetch_payload<T, F>(fetcher: &F, locator: &str) -> Result<(T, String), LoadError>
where
    T: DeserializeOwned,
    F: Fetcher + ?Sized,
{
    let body = fetcher.fetch_text(locator).await?;
    let payload: serde_json::Value = serde_json::from_str(&body)?;
    let data = T::deserialize(&payload)?;
    Ok((data, serde_json::to_string(&payload)?))
}

/// Renders the dataset stored under `cache_key`, or fetches it from `locator`.
///
/// On a hit `render` runs before anything is awaited, then the document is
/// fetched again and the stored copy overwritten; the fresh copy is only seen
/// on the next page load. Refresh failures are logged and dropped.
///
/// On a miss the fetched document is rendered and then stored. If the fetch
/// or decode fails the error is logged and nothing is rendered or stored.
pub async fn cache_or_load<T, S, F, R>(
    store: &S,
    fetcher: &F,
    cache_key: &str,
    locator: &str,
    render: R,
) -> LoadOutcome
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: Fetcher + ?Sized,
    R: FnOnce(T),
{
    if let Some(cached) = store.get(cache_key) {
        match serde_json::from_str::<T>(&cached) {
            Ok(data) => {
                render(data);
                let refreshed = refresh::<T, _, _>(store, fetcher, cache_key, locator).await;
                return LoadOutcome::FromCache { refreshed };
            }
            Err(e) => {
                console_warn!("discarding unreadable cache entry {cache_key}: {e}");
            }
        }
    }

    match fetch_payload::<T, _>(fetcher, locator).await {
        Ok((data, serialized)) => {
            render(data);
            if let Err(e) = store.set(cache_key, &serialized) {
                console_warn!("{cache_key} rendered but not cached: {e}");
            }
            LoadOutcome::Fetched
        }
        Err(e) => {
            console_error!("{cache_key} load error ({locator}): {e}");
            LoadOutcome::Failed(e)
        }
    }
}

async fn refresh<T, S, F>(store: &S, fetcher: &F, cache_key: &str, locator: &str) -> bool
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: Fetcher + ?Sized,
{
    let result = match fetch_payload::<T, _>(fetcher, locator).await {
        Ok((_, serialized)) => store.set(cache_key, &serialized),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            console_warn!("background refresh of {cache_key} ({locator}) failed: {e}");
            false
        }
    }
}

async fn load_section<T, S, F, C>(
    config: &DatasetConfig,
    store: &S,
    fetcher: &F,
    container: &mut C,
) -> LoadOutcome
where
    T: Section,
    S: KeyValueStore + ?Sized,
    F: Fetcher + ?Sized,
    C: Container,
{
    cache_or_load(store, fetcher, config.cache_key, config.locator, |data: T| {
        data.render_into(container)
    })
    .await
}

impl DatasetConfig {
    /// Runs `cache_or_load` for this dataset with its own renderer.
    pub async fn load<S, F, C>(&self, store: &S, fetcher: &F, container: &mut C) -> LoadOutcome
    where
        S: KeyValueStore + ?Sized,
        F: Fetcher + ?Sized,
        C: Container,
    {
        match self.dataset {
            Dataset::Mission => load_section::<Mission, _, _, _>(self, store, fetcher, container).await,
            Dataset::Education => {
                load_section::<Vec<School>, _, _, _>(self, store, fetcher, container).await
            }
            Dataset::Jobs => load_section::<Vec<Job>, _, _, _>(self, store, fetcher, container).await,
            Dataset::Charities => {
                load_section::<Vec<Charity>, _, _, _>(self, store, fetcher, container).await
            }
        }
    }
}

/// Starts loading `config` into `target` on the browser event loop.
pub fn spawn_dataset_load(config: &'static DatasetConfig, target: Element) {
    let Some(mut container) = DomContainer::new(target) else {
        console_error!("#{} is not attached to a document", config.mount_id);
        return;
    };

    leptos::task::spawn_local(async move {
        let store = browser_store();
        let outcome = config
            .load(store.as_ref(), &BrowserFetcher, &mut container)
            .await;
        console_log!("{} loaded: {outcome:?}", config.cache_key);
    });
}
