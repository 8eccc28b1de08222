//! Error types for folio

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use std::borrow::Cow;

/// Main error type for folio operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum FolioError {
    /// No content project is configured, so nothing can be fetched
    #[error("content backend is not configured: {0}")]
    #[diagnostic(
        code(folio::not_configured),
        help("set SANITY_PROJECT_ID or pass --project-id")
    )]
    NotConfigured(&'static str),

    /// Transport-level HTTP failure
    #[error(transparent)]
    #[diagnostic(code(folio::http))]
    Http(#[from] reqwest::Error),

    /// The content API answered with a non-success status
    #[error("content query failed with status {status}: {url}")]
    #[diagnostic(code(folio::status))]
    Status { status: u16, url: String },

    /// A query URL could not be assembled
    #[error(transparent)]
    #[diagnostic(code(folio::url))]
    Url(#[from] url::ParseError),

    /// Parse error with source location
    #[error(transparent)]
    #[diagnostic_source]
    Parse(#[from] ParseError),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(folio::io))]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or saved
    #[error("configuration error: {0}")]
    #[diagnostic(code(folio::config))]
    Config(String),
}

/// Parse error with source code location information
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {}", self.kind)]
#[diagnostic(code(folio::parse))]
pub struct ParseError {
    #[diagnostic_source]
    kind: ParseErrorKind,
    #[source_code]
    src: NamedSource<Cow<'static, str>>,
    #[label("error")]
    err_location: SourceSpan,
    err_line_col: Option<(usize, usize)>,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    /// A structurally valid document that is not shaped like a post.
    pub fn shape(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Shape(message.into()),
            src: NamedSource::new(Cow::Borrowed("input"), Cow::Borrowed("")),
            err_location: SourceSpan::new(SourceOffset::from(0), 0),
            err_line_col: None,
            advice: Some(
                "expected a post object, a { \"result\": post } envelope, or a node array"
                    .to_owned(),
            ),
        }
    }

    /// Attach the document the error came from so miette can point into it.
    pub fn with_source(self, src: NamedSource<Cow<'static, str>>) -> Self {
        let err_location = match self.err_line_col {
            Some((line, column)) => SourceSpan::new(
                SourceOffset::from_location(src.inner(), line, column),
                self.err_location.len(),
            ),
            None => self.err_location,
        };
        Self {
            src,
            err_location,
            ..self
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.err_line_col
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error(transparent)]
    SerdeError(#[from] SerDeError),
    #[error("unexpected document shape: {0}")]
    Shape(String),
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(folio::serde::json))]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    #[diagnostic(code(folio::serde::toml))]
    Toml(#[from] toml::de::Error),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        let line = err.line();
        let column = err.column();
        // serde_json reports line 0 for errors raised outside the reader
        // (e.g. from_value), which has no position to point at.
        let err_line_col = (line > 0).then_some((line, column));
        Self {
            kind: ParseErrorKind::SerdeError(SerDeError::Json(err)),
            src: NamedSource::new(Cow::Borrowed("json"), Cow::Borrowed("")),
            err_location: SourceSpan::new(SourceOffset::from(0), 0),
            err_line_col,
            advice: None,
        }
    }
}

impl From<toml::de::Error> for ParseError {
    fn from(err: toml::de::Error) -> Self {
        let err_location = err
            .span()
            .map(|span| SourceSpan::new(SourceOffset::from(span.start), span.len()))
            .unwrap_or_else(|| SourceSpan::new(SourceOffset::from(0), 0));
        Self {
            kind: ParseErrorKind::SerdeError(SerDeError::Toml(err)),
            src: NamedSource::new(Cow::Borrowed("toml"), Cow::Borrowed("")),
            err_location,
            err_line_col: None,
            advice: None,
        }
    }
}
