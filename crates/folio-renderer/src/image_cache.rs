use std::time::Duration;

use folio_common::cache::TtlCache;
use smol_str::SmolStr;

use crate::block_renderer::RenderOptions;

const DEFAULT_CAPACITY: u64 = 512;
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Resolved image URLs for one browsing session.
///
/// Entries are keyed on the asset reference together with every builder
/// parameter in [`RenderOptions`], so contexts with different options can
/// share one cache. Create one per session and call
/// [`ImageUrlCache::clear`] on navigation. Empty URLs (unresolvable assets)
/// are never stored.
#[derive(Debug)]
pub struct ImageUrlCache {
    urls: TtlCache<(SmolStr, RenderOptions), String>,
}

impl ImageUrlCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_limits(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            urls: TtlCache::new(max_capacity, ttl),
        }
    }

    pub fn get(&self, asset_ref: &str, options: &RenderOptions) -> Option<String> {
        self.urls.get(&(SmolStr::new(asset_ref), *options))
    }

    /// Returns the cached URL for `(asset_ref, options)` or builds and stores it.
    pub fn get_or_build(
        &self,
        asset_ref: &str,
        options: RenderOptions,
        build: impl FnOnce() -> String,
    ) -> String {
        let key = (SmolStr::new(asset_ref), options);
        if let Some(url) = self.urls.get(&key) {
            return url;
        }
        let url = build();
        if !url.is_empty() {
            self.urls.insert(key, url.clone());
        }
        url
    }

    pub fn clear(&self) {
        self.urls.clear();
    }
}

impl Default for ImageUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_url::FitMode;
    use std::cell::Cell;

    fn width(px: u32) -> RenderOptions {
        RenderOptions {
            image_width: px,
            ..Default::default()
        }
    }

    #[test]
    fn builds_once_per_key() {
        let cache = ImageUrlCache::new();
        let calls = Cell::new(0);
        let build = || {
            calls.set(calls.get() + 1);
            "https://cdn/x.jpg".to_string()
        };
        assert_eq!(cache.get_or_build("image-x", width(800), build), "https://cdn/x.jpg");
        assert_eq!(cache.get_or_build("image-x", width(800), build), "https://cdn/x.jpg");
        assert_eq!(calls.get(), 1);

        cache.get_or_build("image-x", width(1200), build);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn fit_and_quality_are_part_of_the_key() {
        let cache = ImageUrlCache::new();
        cache.get_or_build("image-x", RenderOptions::default(), || "max".to_string());
        let cropped = RenderOptions {
            image_fit: FitMode::Crop,
            ..Default::default()
        };
        let lower = RenderOptions {
            image_quality: 30,
            ..Default::default()
        };
        assert_eq!(cache.get("image-x", &cropped), None);
        assert_eq!(cache.get("image-x", &lower), None);
        assert_eq!(cache.get_or_build("image-x", cropped, || "crop".to_string()), "crop");
        assert_eq!(
            cache.get("image-x", &RenderOptions::default()).as_deref(),
            Some("max")
        );
    }

    #[test]
    fn empty_urls_are_not_cached() {
        let cache = ImageUrlCache::new();
        assert_eq!(cache.get_or_build("image-x", width(800), String::new), "");
        assert_eq!(cache.get("image-x", &width(800)), None);
    }

    #[test]
    fn clear_drops_session_entries() {
        let cache = ImageUrlCache::new();
        cache.get_or_build("image-x", width(800), || "u".to_string());
        cache.clear();
        assert_eq!(cache.get("image-x", &width(800)), None);
    }
}
