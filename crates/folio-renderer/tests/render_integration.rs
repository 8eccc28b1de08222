// End-to-end rendering: post JSON in, blocks, TOC and HTML out.

use folio_common::config::SanityConfig;
use folio_common::model::{HeadingLevel, Node, Post};
use folio_renderer::image_url::ImageSource;
use folio_renderer::{
    Anchors, NoopImages, RenderContext, RenderedBlock, html, render_document, render_post, slugify,
};
use proptest::prelude::*;
use smol_str::SmolStr;

const POST: &str = r#"{
  "_id": "post-1",
  "title": "Rust で作るブログ",
  "slug": { "current": "rust-blog" },
  "excerpt": "Notes",
  "publishedAt": "2025-01-01T00:00:00Z",
  "body": [
    { "_type": "block", "_key": "b1", "style": "normal", "children": [{ "_type": "span", "text": "Welcome to the " }, { "_type": "span", "text": "blog." }] },
    { "_type": "block", "_key": "b2", "style": "h2", "children": [{ "_type": "span", "text": "はじめに" }] },
    { "_type": "image", "_key": "i1", "asset": { "_ref": "image-abc123-800x600-webp" }, "alt": "Setup" },
    { "_type": "block", "_key": "b3", "style": "h3", "children": [{ "_type": "span", "text": "Setup & Tools" }] },
    { "_type": "block", "_key": "b4", "style": "blockquote", "children": [{ "_type": "span", "text": "Keep it simple." }] },
    { "_type": "block", "_key": "b5", "style": "h2", "children": [{ "_type": "span", "text": "はじめに" }] },
    { "_type": "block", "_key": "b6", "style": "h4", "children": [{ "_type": "span", "text": "   " }] },
    { "_type": "code", "_key": "c1", "code": "fn main() {}" },
    { "_type": "block", "_key": "b7", "style": "h1", "children": [{ "_type": "span", "text": "Big" }] }
  ]
}"#;

fn post() -> Post {
    Post::from_json("post.json", POST).expect("fixture decodes")
}

#[test]
fn unconfigured_backend_renders_text_only() {
    let post = post();
    let rendered = render_post(&post.body, &RenderContext::new(&NoopImages));

    insta::assert_snapshot!(html::write_document(&rendered.blocks), @r##"
    <div class="folio-document">
    <p>Welcome to the blog.</p>
    <h2 id="はじめに">はじめに</h2>
    <h3 id="setup-tools">Setup &amp; Tools</h3>
    <blockquote>Keep it simple.</blockquote>
    <h2 id="はじめに-1">はじめに</h2>
    <p>Big</p>
    </div>
    "##);

    insta::assert_snapshot!(html::write_toc(&rendered.toc), @r##"
    <nav class="toc"><ol>
    <li class="toc-level-2"><a href="#はじめに">はじめに</a></li>
    <li class="toc-level-3"><a href="#setup-tools">Setup &amp; Tools</a></li>
    <li class="toc-level-2"><a href="#はじめに-1">はじめに</a></li>
    </ol></nav>
    "##);
}

#[test]
fn configured_backend_renders_images() {
    let post = post();
    let images = ImageSource::from_config(&SanityConfig {
        project_id: "proj".into(),
        ..Default::default()
    });
    let rendered = render_post(&post.body, &RenderContext::new(&images));

    assert_eq!(
        rendered.blocks[2],
        RenderedBlock::Image {
            key: Some("i1".into()),
            url: "https://cdn.sanity.io/images/proj/production/abc123-800x600.webp?w=1200&q=80&fit=max"
                .into(),
            alt: Some("Setup".into()),
        }
    );
    assert_eq!(rendered.blocks.len(), 7);
}

#[test]
fn toc_keys_and_levels_follow_the_body() {
    let toc = render_post(&post().body, &RenderContext::new(&NoopImages)).toc;
    let summary: Vec<_> = toc
        .iter()
        .map(|e| (e.key.as_str(), e.slug.as_str(), e.level.as_u8()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("b2", "はじめに", 2),
            ("b3", "setup-tools", 3),
            ("b5", "はじめに-1", 2),
        ]
    );
}

#[test]
fn blocks_serialize_with_type_tags() {
    let rendered = render_post(&post().body, &RenderContext::new(&NoopImages));
    let json = serde_json::to_value(&rendered.blocks[1]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "heading",
            "key": "b2",
            "level": 2,
            "text": "はじめに",
            "anchor": "はじめに",
        })
    );
}

fn body_strategy() -> impl Strategy<Value = Vec<Node>> {
    let text = prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just("Intro".to_string()),
        Just("はじめに".to_string()),
        "[a-zA-Z?! ]{0,12}",
    ];
    let node = (0u8..5, text, any::<bool>());
    prop::collection::vec(node, 0..24).prop_map(|nodes| {
        nodes
            .into_iter()
            .enumerate()
            .map(|(i, (kind, text, keyed))| {
                let key = keyed.then(|| SmolStr::new(format!("k{i}")));
                match kind {
                    0 => Node::Paragraph { key, text },
                    1 => Node::Heading {
                        key,
                        level: HeadingLevel::H2,
                        text,
                    },
                    2 => Node::Heading {
                        key,
                        level: HeadingLevel::H3,
                        text,
                    },
                    3 => Node::Blockquote { key, text },
                    _ => Node::Image {
                        key,
                        asset_ref: Some("image-abc-10x10-png".into()),
                        alt: None,
                    },
                }
            })
            .collect()
    })
}

fn heading_texts(body: &[Node]) -> Vec<String> {
    body.iter()
        .filter_map(|node| match node {
            Node::Heading { text, .. } if !text.trim().is_empty() => Some(text.trim().to_owned()),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_toc_follows_document_order(body in body_strategy()) {
        let anchors = Anchors::derive(&body);
        let toc_texts: Vec<_> = anchors.toc().iter().map(|e| e.text.clone()).collect();
        prop_assert_eq!(toc_texts, heading_texts(&body));
    }

    #[test]
    fn prop_toc_slugs_are_unique_for_plain_texts(body in body_strategy()) {
        // Heading texts here never slug to something ending in "-<digits>",
        // so suffixed repeats cannot collide with a literal heading.
        let anchors = Anchors::derive(&body);
        let mut slugs: Vec<_> = anchors.toc().iter().map(|e| e.slug.clone()).collect();
        let total = slugs.len();
        slugs.sort();
        slugs.dedup();
        prop_assert_eq!(slugs.len(), total);
    }

    #[test]
    fn prop_repeats_get_numbered_suffixes(text in "[a-zA-Z][a-zA-Z ]{0,10}", repeats in 1usize..6) {
        let body: Vec<_> = (0..repeats)
            .map(|i| Node::Heading {
                key: Some(SmolStr::new(format!("h{i}"))),
                level: if i % 2 == 0 { HeadingLevel::H2 } else { HeadingLevel::H4 },
                text: text.clone(),
            })
            .collect();
        let base = slugify(&text);
        let expected: Vec<_> = (0..repeats)
            .map(|i| if i == 0 { base.clone() } else { format!("{base}-{i}") })
            .collect();
        let slugs: Vec<_> = Anchors::derive(&body).into_toc().into_iter().map(|e| e.slug).collect();
        prop_assert_eq!(slugs, expected);
    }

    #[test]
    fn prop_rendered_anchors_match_slug_map(body in body_strategy()) {
        let anchors = Anchors::derive(&body);
        let rendered = render_document(&body, &anchors, &RenderContext::new(&NoopImages));
        for block in &rendered {
            if let RenderedBlock::Heading { key: Some(key), anchor, .. } = block {
                prop_assert_eq!(Some(anchor.as_str()), anchors.slug_for(key));
            }
        }
    }

    #[test]
    fn prop_rendering_preserves_order(body in body_strategy()) {
        let anchors = Anchors::derive(&body);
        let rendered = render_document(&body, &anchors, &RenderContext::new(&NoopImages));
        let node_keys: Vec<_> = body.iter().filter_map(Node::key).collect();
        let mut remaining = node_keys.iter();
        for key in rendered.iter().filter_map(RenderedBlock::key) {
            prop_assert!(remaining.any(|k| *k == key), "{} out of order", key);
        }
        let no_images = rendered.iter().all(|b| !matches!(b, RenderedBlock::Image { .. }));
        prop_assert!(no_images);
    }

    #[test]
    fn prop_heading_ids_match_toc_links(body in body_strategy()) {
        let rendered = render_post(&body, &RenderContext::new(&NoopImages));
        let ids: Vec<_> = rendered
            .blocks
            .iter()
            .filter_map(|block| match block {
                RenderedBlock::Heading { anchor, .. } => Some(anchor.clone()),
                _ => None,
            })
            .collect();
        let links: Vec<_> = rendered.toc.iter().map(|e| e.slug.clone()).collect();
        prop_assert_eq!(ids, links);
    }

    #[test]
    fn prop_derivation_is_idempotent(body in body_strategy()) {
        prop_assert_eq!(Anchors::derive(&body), Anchors::derive(&body));
    }
}
