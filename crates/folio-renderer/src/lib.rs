//! Folio renderer
//!
//! Turns the Portable Text body of a post into display blocks with anchored
//! headings, plus the table of contents for those headings.
//!
//! ```ignore
//! let images = ImageSource::from_config(&config);
//! let rendered = render_post(&post.body, &RenderContext::new(&images));
//! let html = html::write_document(&rendered.blocks);
//! let toc = html::write_toc(&rendered.toc);
//! ```

use folio_common::model::Node;

pub mod block_renderer;
pub mod html;
pub mod image_cache;
pub mod image_url;
pub mod slug;
pub mod toc;

pub use block_renderer::{RenderContext, RenderOptions, RenderedBlock, render_document};
pub use image_cache::ImageUrlCache;
pub use image_url::{FitMode, ImageSource, ImageUrlBuilder, ImageUrlSource, NoopImages};
pub use slug::slugify;
pub use toc::{Anchors, TocEntry, derive_anchors};

/// Display blocks and table of contents for one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub blocks: Vec<RenderedBlock>,
    pub toc: Vec<TocEntry>,
}

/// Derives anchors for `body`, then renders it with them.
pub fn render_post<S: ImageUrlSource>(body: &[Node], ctx: &RenderContext<'_, S>) -> RenderedPost {
    let _span = tracing::debug_span!("render_post", nodes = body.len()).entered();
    let anchors = Anchors::derive(body);
    let blocks = render_document(body, &anchors, ctx);
    tracing::debug!(
        blocks = blocks.len(),
        headings = anchors.toc().len(),
        "rendered post body"
    );
    RenderedPost {
        blocks,
        toc: anchors.into_toc(),
    }
}
