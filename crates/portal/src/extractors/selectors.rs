// ABOUTME: Compiled CSS selector cache so each selector string is parsed once.
// ABOUTME: Invalid selectors are cached as None and never match.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` for an invalid selector. A poisoned lock falls back to compiling
/// without caching.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        cache
            .entry(css.to_string())
            .or_insert_with(|| compiled.clone());
    }
    compiled
}
