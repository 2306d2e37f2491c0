// src/error.rs
use petty_xpath1::XPathError;
use thiserror::Error;

/// Everything that can stop a query from the command line.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}
