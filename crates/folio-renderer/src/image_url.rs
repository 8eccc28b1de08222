//! Image URL building for asset references.
//!
//! The renderer only sees the [`ImageUrlSource`] capability. Which
//! implementation backs it is decided once, from configuration, by
//! [`ImageSource::from_config`]: a configured project gets real CDN URLs,
//! an unconfigured one gets [`NoopImages`], whose URLs are always empty.

use std::fmt::Write;

use folio_common::config::SanityConfig;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Resize behaviour requested from the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitMode {
    Clip,
    Crop,
    Fill,
    FillMax,
    #[default]
    Max,
    Scale,
    Min,
}

impl FitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Clip => "clip",
            FitMode::Crop => "crop",
            FitMode::Fill => "fill",
            FitMode::FillMax => "fillmax",
            FitMode::Max => "max",
            FitMode::Scale => "scale",
            FitMode::Min => "min",
        }
    }
}

/// Fluent URL builder for one image.
pub trait ImageUrlBuilder: Sized {
    fn width(self, px: u32) -> Self;
    fn height(self, px: u32) -> Self;
    fn fit(self, mode: FitMode) -> Self;
    fn quality(self, quality: u8) -> Self;
    /// The finished URL, or `""` when the image cannot be resolved.
    fn url(&self) -> String;
}

/// Hands out a builder per asset reference.
pub trait ImageUrlSource {
    type Builder: ImageUrlBuilder;

    fn image(&self, asset_ref: &str) -> Self::Builder;
}

/// A parsed `image-<id>-<W>x<H>-<ext>` asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    pub fn parse(asset_ref: &str) -> Option<Self> {
        let rest = asset_ref.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;
        let (width, height) = dimensions.split_once('x')?;
        let (width, height) = (width.parse().ok()?, height.parse().ok()?);
        if id.is_empty() || format.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_owned(),
            width,
            height,
            format: format.to_owned(),
        })
    }

    fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityImages {
    project_id: String,
    dataset: String,
}

impl SanityImages {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }
}

impl ImageUrlSource for SanityImages {
    type Builder = SanityImageUrl;

    fn image(&self, asset_ref: &str) -> SanityImageUrl {
        let asset = AssetId::parse(asset_ref);
        if asset.is_none() {
            tracing::debug!(asset_ref, "asset reference does not parse");
        }
        SanityImageUrl {
            base: asset.map(|asset| {
                format!(
                    "{CDN_BASE}/{}/{}/{}",
                    self.project_id,
                    self.dataset,
                    asset.file_name()
                )
            }),
            width: None,
            height: None,
            fit: None,
            quality: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityImageUrl {
    base: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<FitMode>,
    quality: Option<u8>,
}

impl ImageUrlBuilder for SanityImageUrl {
    fn width(mut self, px: u32) -> Self {
        self.width = Some(px);
        self
    }

    fn height(mut self, px: u32) -> Self {
        self.height = Some(px);
        self
    }

    fn fit(mut self, mode: FitMode) -> Self {
        self.fit = Some(mode);
        self
    }

    fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality.min(100));
        self
    }

    fn url(&self) -> String {
        let Some(base) = &self.base else {
            return String::new();
        };
        let mut url = base.clone();
        let mut sep = '?';
        let mut param = |name: &str, value: &dyn std::fmt::Display| {
            let _ = write!(url, "{sep}{name}={value}");
            sep = '&';
        };
        // Same parameter order as the CDN's own client library.
        if let Some(w) = self.width {
            param("w", &w);
        }
        if let Some(h) = self.height {
            param("h", &h);
        }
        if let Some(q) = self.quality {
            param("q", &q);
        }
        if let Some(fit) = self.fit {
            param("fit", &fit.as_str());
        }
        url
    }
}

/// Stand-in for an unconfigured backend. Every URL is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopImages;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopImageUrl;

impl ImageUrlSource for NoopImages {
    type Builder = NoopImageUrl;

    fn image(&self, _asset_ref: &str) -> NoopImageUrl {
        NoopImageUrl
    }
}

impl ImageUrlBuilder for NoopImageUrl {
    fn width(self, _px: u32) -> Self {
        self
    }

    fn height(self, _px: u32) -> Self {
        self
    }

    fn fit(self, _mode: FitMode) -> Self {
        self
    }

    fn quality(self, _quality: u8) -> Self {
        self
    }

    fn url(&self) -> String {
        String::new()
    }
}

/// The image source picked from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Sanity(SanityImages),
    Noop(NoopImages),
}

impl ImageSource {
    pub fn from_config(config: &SanityConfig) -> Self {
        if config.is_configured() {
            ImageSource::Sanity(SanityImages::new(
                config.project_id.trim(),
                config.dataset.trim(),
            ))
        } else {
            tracing::debug!("no content project configured, images will be skipped");
            ImageSource::Noop(NoopImages)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUrl {
    Sanity(SanityImageUrl),
    Noop(NoopImageUrl),
}

impl ImageUrlSource for ImageSource {
    type Builder = ImageUrl;

    fn image(&self, asset_ref: &str) -> ImageUrl {
        match self {
            ImageSource::Sanity(images) => ImageUrl::Sanity(images.image(asset_ref)),
            ImageSource::Noop(images) => ImageUrl::Noop(images.image(asset_ref)),
        }
    }
}

impl ImageUrlBuilder for ImageUrl {
    fn width(self, px: u32) -> Self {
        match self {
            ImageUrl::Sanity(b) => ImageUrl::Sanity(b.width(px)),
            ImageUrl::Noop(b) => ImageUrl::Noop(b.width(px)),
        }
    }

    fn height(self, px: u32) -> Self {
        match self {
            ImageUrl::Sanity(b) => ImageUrl::Sanity(b.height(px)),
            ImageUrl::Noop(b) => ImageUrl::Noop(b.height(px)),
        }
    }

    fn fit(self, mode: FitMode) -> Self {
        match self {
            ImageUrl::Sanity(b) => ImageUrl::Sanity(b.fit(mode)),
            ImageUrl::Noop(b) => ImageUrl::Noop(b.fit(mode)),
        }
    }

    fn quality(self, quality: u8) -> Self {
        match self {
            ImageUrl::Sanity(b) => ImageUrl::Sanity(b.quality(quality)),
            ImageUrl::Noop(b) => ImageUrl::Noop(b.quality(quality)),
        }
    }

    fn url(&self) -> String {
        match self {
            ImageUrl::Sanity(b) => b.url(),
            ImageUrl::Noop(b) => b.url(),
        }
    }
}
