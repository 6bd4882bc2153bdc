use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

use super::error::LoadError;

/// Retrieves the raw text behind a resource locator.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch_text(&self, locator: &str) -> Result<String, LoadError>;
}

/// `window.fetch` with `cache: "force-cache"`, so repeat visits are served
/// from the HTTP cache whenever the browser still holds the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserFetcher;

impl Fetcher for BrowserFetcher {
    async fn fetch_text(&self, locator: &str) -> Result<String, LoadError> {
        let network = |e: JsValue| LoadError::Network {
            locator: locator.to_string(),
            message: format!("{e:?}"),
        };

        let window = web_sys::window().ok_or_else(|| LoadError::Network {
            locator: locator.to_string(),
            message: "no window".to_string(),
        })?;

        let init = RequestInit::new();
        init.set_method("GET");
        init.set_cache(RequestCache::ForceCache);
        let request = Request::new_with_str_and_init(locator, &init).map_err(network)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;

        if !response.ok() {
            return Err(LoadError::Status {
                locator: locator.to_string(),
                status: response.status(),
            });
        }

        JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?
            .as_string()
            .ok_or_else(|| LoadError::Malformed(format!("{locator} body is not text")))
    }
}
