//! HTML output for rendered blocks and the table of contents.

use std::fmt::Write;

use pulldown_cmark_escape::escape_html;

use crate::block_renderer::RenderedBlock;
use crate::toc::TocEntry;

/// Blocks wrapped in the document container.
pub fn write_document(blocks: &[RenderedBlock]) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"folio-document\">\n");
    write_blocks(&mut html, blocks);
    html.push_str("</div>\n");
    html
}

pub fn write_blocks(html: &mut String, blocks: &[RenderedBlock]) {
    for block in blocks {
        write_block(html, block);
    }
}

pub fn write_block(html: &mut String, block: &RenderedBlock) {
    match block {
        RenderedBlock::Paragraph { text, .. } => {
            html.push_str("<p>");
            let _ = escape_html(&mut *html, text);
            html.push_str("</p>\n");
        }
        RenderedBlock::Heading {
            level,
            text,
            anchor,
            ..
        } => {
            let level = level.as_u8();
            let _ = write!(html, "<h{level} id=\"");
            let _ = escape_html(&mut *html, anchor);
            html.push_str("\">");
            let _ = escape_html(&mut *html, text);
            let _ = write!(html, "</h{level}>\n");
        }
        RenderedBlock::Blockquote { text, .. } => {
            html.push_str("<blockquote>");
            let _ = escape_html(&mut *html, text);
            html.push_str("</blockquote>\n");
        }
        RenderedBlock::Image { url, alt, .. } => {
            html.push_str("<figure><img src=\"");
            let _ = escape_html(&mut *html, url);
            html.push('"');
            if let Some(alt) = alt {
                html.push_str(" alt=\"");
                let _ = escape_html(&mut *html, alt);
                html.push('"');
            }
            html.push_str(" loading=\"lazy\" /></figure>\n");
        }
    }
}

/// An ordered list of in-page links. Empty when there are no headings.
pub fn write_toc(entries: &[TocEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut html = String::new();
    html.push_str("<nav class=\"toc\"><ol>\n");
    for entry in entries {
        let _ = write!(html, "<li class=\"toc-level-{}\"><a href=\"#", entry.level.as_u8());
        let _ = escape_html(&mut html, &entry.slug);
        html.push_str("\">");
        let _ = escape_html(&mut html, &entry.text);
        html.push_str("</a></li>\n");
    }
    html.push_str("</ol></nav>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::model::HeadingLevel;

    #[test]
    fn escapes_text_and_attributes() {
        let html = write_document(&[
            RenderedBlock::Heading {
                key: None,
                level: HeadingLevel::H3,
                text: "Fish & <Chips>".into(),
                anchor: "fish-chips".into(),
            },
            RenderedBlock::Paragraph {
                key: None,
                text: "say \"hi\"".into(),
            },
            RenderedBlock::Image {
                key: None,
                url: "https://cdn/x.png?w=1&q=2".into(),
                alt: Some("a \"b\"".into()),
            },
            RenderedBlock::Blockquote {
                key: None,
                text: "<script>".into(),
            },
        ]);
        insta::assert_snapshot!(html, @r##"
        <div class="folio-document">
        <h3 id="fish-chips">Fish &amp; &lt;Chips&gt;</h3>
        <p>say &quot;hi&quot;</p>
        <figure><img src="https://cdn/x.png?w=1&amp;q=2" alt="a &quot;b&quot;" loading="lazy" /></figure>
        <blockquote>&lt;script&gt;</blockquote>
        </div>
        "##);
    }

    #[test]
    fn image_without_alt_omits_attribute() {
        let mut html = String::new();
        write_block(
            &mut html,
            &RenderedBlock::Image {
                key: None,
                url: "u".into(),
                alt: None,
            },
        );
        assert_eq!(html, "<figure><img src=\"u\" loading=\"lazy\" /></figure>\n");
    }

    #[test]
    fn toc_lists_entries_in_order() {
        let toc = write_toc(&[
            TocEntry {
                key: "a".into(),
                slug: "intro".into(),
                text: "Intro".into(),
                level: HeadingLevel::H2,
            },
            TocEntry {
                key: "b".into(),
                slug: "はじめに".into(),
                text: "はじめに".into(),
                level: HeadingLevel::H3,
            },
        ]);
        insta::assert_snapshot!(toc, @r##"
        <nav class="toc"><ol>
        <li class="toc-level-2"><a href="#intro">Intro</a></li>
        <li class="toc-level-3"><a href="#はじめに">はじめに</a></li>
        </ol></nav>
        "##);
    }

    #[test]
    fn empty_toc_writes_nothing() {
        assert_eq!(write_toc(&[]), "");
    }
}
