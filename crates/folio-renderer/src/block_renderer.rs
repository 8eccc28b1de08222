use folio_common::model::{HeadingLevel, Node};
use serde::Serialize;
use smol_str::SmolStr;

use crate::image_cache::ImageUrlCache;
use crate::image_url::{FitMode, ImageUrlBuilder, ImageUrlSource};
use crate::slug::slugify;
use crate::toc::Anchors;

/// A body node ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderedBlock {
    Paragraph {
        key: Option<SmolStr>,
        text: String,
    },
    Heading {
        key: Option<SmolStr>,
        level: HeadingLevel,
        text: String,
        anchor: String,
    },
    Blockquote {
        key: Option<SmolStr>,
        text: String,
    },
    Image {
        key: Option<SmolStr>,
        url: String,
        alt: Option<String>,
    },
}

impl RenderedBlock {
    pub fn key(&self) -> Option<&str> {
        match self {
            RenderedBlock::Paragraph { key, .. }
            | RenderedBlock::Heading { key, .. }
            | RenderedBlock::Blockquote { key, .. }
            | RenderedBlock::Image { key, .. } => key.as_deref(),
        }
    }
}

/// How body images are requested from the image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderOptions {
    pub image_width: u32,
    pub image_fit: FitMode,
    pub image_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_width: 1200,
            image_fit: FitMode::Max,
            image_quality: 80,
        }
    }
}

pub struct RenderContext<'a, S> {
    pub images: &'a S,
    pub options: RenderOptions,
    pub cache: Option<&'a ImageUrlCache>,
}

impl<'a, S: ImageUrlSource> RenderContext<'a, S> {
    pub fn new(images: &'a S) -> Self {
        Self {
            images,
            options: RenderOptions::default(),
            cache: None,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: &'a ImageUrlCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn image_url(&self, asset_ref: &str) -> String {
        let build = || {
            self.images
                .image(asset_ref)
                .width(self.options.image_width)
                .fit(self.options.image_fit)
                .quality(self.options.image_quality)
                .url()
        };
        match self.cache {
            Some(cache) => cache.get_or_build(asset_ref, self.options, build),
            None => build(),
        }
    }
}

/// Renders a body in order. Nodes with nothing to show are dropped; nothing
/// here fails.
pub fn render_document<S: ImageUrlSource>(
    nodes: &[Node],
    anchors: &Anchors,
    ctx: &RenderContext<'_, S>,
) -> Vec<RenderedBlock> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| render_node(index, node, anchors, ctx))
        .collect()
}

/// Renders the node at `index` of the body `anchors` was derived from.
pub fn render_node<S: ImageUrlSource>(
    index: usize,
    node: &Node,
    anchors: &Anchors,
    ctx: &RenderContext<'_, S>,
) -> Option<RenderedBlock> {
    match node {
        Node::Paragraph { key, text } => non_empty(text).map(|text| RenderedBlock::Paragraph {
            key: key.clone(),
            text,
        }),
        Node::Heading { key, level, text } => {
            let text = non_empty(text)?;
            let anchor = anchors
                .anchor_for(index, key.as_deref())
                .map(str::to_owned)
                .unwrap_or_else(|| slugify(&text));
            Some(RenderedBlock::Heading {
                key: key.clone(),
                level: *level,
                text,
                anchor,
            })
        }
        Node::Blockquote { key, text } => non_empty(text).map(|text| RenderedBlock::Blockquote {
            key: key.clone(),
            text,
        }),
        Node::Image {
            key,
            asset_ref,
            alt,
        } => {
            let url = asset_ref
                .as_deref()
                .map(|asset_ref| ctx.image_url(asset_ref))
                .unwrap_or_default();
            if url.is_empty() {
                tracing::debug!(key = ?key, "skipping image without a resolvable url");
                return None;
            }
            Some(RenderedBlock::Image {
                key: key.clone(),
                url,
                alt: alt
                    .as_deref()
                    .map(str::trim)
                    .filter(|alt| !alt.is_empty())
                    .map(str::to_owned),
            })
        }
        Node::Unknown { key, kind } => {
            tracing::debug!(key = ?key, kind = %kind, "skipping unsupported node type");
            None
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
