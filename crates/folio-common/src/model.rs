//! Blog content model.
//!
//! Posts arrive from the content store as loosely-shaped Portable Text JSON.
//! Everything is decoded into the closed [`Node`] type here, once, so the
//! renderer never has to look at raw JSON. Decoding of a body never fails:
//! missing or mistyped fields read as empty, unknown block styles become
//! paragraphs, and unknown node types become [`Node::Unknown`].

use std::borrow::Cow;

use miette::NamedSource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::error::ParseError;

/// Heading depth for the heading styles the content schema allows in a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum HeadingLevel {
    H2 = 2,
    H3 = 3,
    H4 = 4,
}

impl HeadingLevel {
    /// Parses a block style tag. Only `h2`, `h3` and `h4` are headings.
    pub fn from_style(style: &str) -> Option<Self> {
        match style {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.as_u8()
    }
}

/// One top-level node of a post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Paragraph {
        key: Option<SmolStr>,
        text: String,
    },
    Heading {
        key: Option<SmolStr>,
        level: HeadingLevel,
        text: String,
    },
    Blockquote {
        key: Option<SmolStr>,
        text: String,
    },
    Image {
        key: Option<SmolStr>,
        asset_ref: Option<SmolStr>,
        alt: Option<String>,
    },
    /// A node type this model has no rendering for (code, embeds, ...).
    Unknown {
        key: Option<SmolStr>,
        kind: SmolStr,
    },
}

impl Node {
    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Paragraph { key, .. }
            | Node::Heading { key, .. }
            | Node::Blockquote { key, .. }
            | Node::Image { key, .. }
            | Node::Unknown { key, .. } => key.as_deref(),
        }
    }

    /// Untrimmed text of text-bearing nodes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Paragraph { text, .. }
            | Node::Heading { text, .. }
            | Node::Blockquote { text, .. } => Some(text),
            Node::Image { .. } | Node::Unknown { .. } => None,
        }
    }

    /// Decodes a single Portable Text node.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!("body node is not an object, treating as unknown");
            return Node::Unknown {
                key: None,
                kind: SmolStr::default(),
            };
        };

        let key = str_field(obj, &["_key", "key"]).map(SmolStr::new);
        let kind = str_field(obj, &["_type", "type"]).unwrap_or_default();

        match kind {
            "block" => {
                let text = span_text(obj);
                let style = str_field(obj, &["style"]).unwrap_or("normal");
                if let Some(level) = HeadingLevel::from_style(style) {
                    return Node::Heading { key, level, text };
                }
                match style {
                    "blockquote" => Node::Blockquote { key, text },
                    "normal" => Node::Paragraph { key, text },
                    other => {
                        tracing::debug!(style = other, "unknown block style, rendering as paragraph");
                        Node::Paragraph { key, text }
                    }
                }
            }
            "image" => Node::Image {
                key,
                asset_ref: asset_ref(obj).map(SmolStr::new),
                alt: str_field(obj, &["alt"]).map(str::to_owned),
            },
            other => Node::Unknown {
                key,
                kind: SmolStr::new(other),
            },
        }
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| obj.get(*name).and_then(Value::as_str))
}

fn span_text(obj: &Map<String, Value>) -> String {
    obj.get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(|span| span.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn asset_ref(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("asset")
        .and_then(|asset| asset.get("_ref"))
        .and_then(Value::as_str)
        .or_else(|| str_field(obj, &["assetRef"]))
        .filter(|r| !r.is_empty())
}

/// Decodes a body array. Anything that is not an array is an empty body.
pub fn decode_body(value: &Value) -> Vec<Node> {
    match value {
        Value::Array(nodes) => nodes.iter().map(Node::from_value).collect(),
        Value::Null => Vec::new(),
        _ => {
            tracing::warn!("post body is not an array, treating as empty");
            Vec::new()
        }
    }
}

fn deserialize_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(decode_body(&value))
}

/// Reference arrays (`categories[]->`) project deleted documents as `null`.
/// Those, and elements that do not decode, are dropped instead of failing
/// the whole post.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            tracing::warn!("expected a list, treating as empty");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            if item.is_null() {
                tracing::debug!("dropping dangling reference");
                return None;
            }
            serde_json::from_value(item)
                .inspect_err(|err| tracing::warn!(error = %err, "dropping undecodable list item"))
                .ok()
        })
        .collect())
}

/// GROQ projections yield `null` for missing fields, which serde's
/// `default` alone does not cover.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSlug {
    #[serde(deserialize_with = "null_default")]
    pub current: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetReference {
    #[serde(rename = "_ref", deserialize_with = "null_default")]
    pub reference: String,
}

/// An image field on a document (main image, author portrait).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageField {
    pub asset: Option<AssetReference>,
    pub alt: Option<String>,
}

impl ImageField {
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .map(|a| a.reference.as_str())
            .filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    pub image: Option<ImageField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(rename = "_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: DocumentSlug,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(rename = "_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: DocumentSlug,
    pub color: Option<String>,
}

/// A blog post as returned by the post queries in [`crate::groq`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: DocumentSlug,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub excerpt: String,
    pub main_image: Option<ImageField>,
    pub author: Option<Author>,
    pub published_at: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub categories: Vec<Category>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "deserialize_body")]
    pub body: Vec<Node>,
    #[serde(deserialize_with = "null_default")]
    pub featured: bool,
    pub view_count: Option<u64>,
}

impl Post {
    /// A post with nothing but a body, for rendering bare node arrays.
    pub fn from_body(body: Vec<Node>) -> Self {
        Self {
            body,
            ..Default::default()
        }
    }

    /// Decodes a post document from JSON text.
    ///
    /// Accepts a post object, a query envelope `{ "result": post }`, or a
    /// bare array of body nodes. `name` labels the source in diagnostics.
    pub fn from_json(name: &str, src: &str) -> Result<Self, ParseError> {
        let with_source = |err: ParseError| {
            err.with_source(NamedSource::new(name, Cow::Owned(src.to_owned())))
        };
        let value: Value = serde_json::from_str(src).map_err(|e| with_source(e.into()))?;
        Self::from_value(value).map_err(with_source)
    }

    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Array(nodes) => Ok(Self::from_body(
                nodes.iter().map(Node::from_value).collect(),
            )),
            Value::Object(mut obj) => match obj.remove("result") {
                Some(Value::Null) => Err(ParseError::shape("query result is null")),
                Some(inner) => Self::from_value(inner),
                None => Ok(serde_json::from_value(Value::Object(obj))?),
            },
            other => Err(ParseError::shape(format!(
                "top-level value is {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Plain text of a body: trimmed text of every non-empty text node, separated
/// by blank lines. Images and unknown nodes contribute nothing.
pub fn plain_text(nodes: &[Node]) -> String {
    nodes
        .iter()
        .filter_map(Node::text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
