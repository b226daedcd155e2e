//! Dataset resolution: inline body → colocated file → shared file.
//!
//! The fallback chain is modeled as an explicit ordered list of source
//! providers so the precedence rule is independently testable rather than
//! implicit in path concatenation.
//!
//! An inline payload wins only when it contains *every* required field;
//! a partial body falls through to the file providers. Column validation of
//! a loaded file is the consuming engine's job (missing columns there are a
//! validation error, not a resolution error).

use std::path::PathBuf;

use serde_json::Value;

use crate::config::DataConfig;
use crate::data::frame::Frame;
use crate::error::EngineError;

/// Static description of one logical dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSpec {
    pub logical_name: &'static str,
    pub file_name: &'static str,
    pub required_fields: &'static [&'static str],
}

pub const FORECAST_DATASET: DatasetSpec = DatasetSpec {
    logical_name: "forecast",
    file_name: "forecast.csv",
    required_fields: &["ds", "y"],
};

pub const PRICE_SALES_DATASET: DatasetSpec = DatasetSpec {
    logical_name: "price_sales",
    file_name: "price_sales.csv",
    required_fields: &["price", "units"],
};

pub const MARKETING_DATASET: DatasetSpec = DatasetSpec {
    logical_name: "marketing",
    file_name: "marketing.csv",
    required_fields: &["spend", "conversions"],
};

/// Where a resolved dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTag {
    Body,
    File(PathBuf),
}

impl SourceTag {
    /// Descriptor string carried into results: `"body"` or the file path.
    pub fn describe(&self) -> String {
        match self {
            SourceTag::Body => "body".to_string(),
            SourceTag::File(path) => path.display().to_string(),
        }
    }
}

enum Provider<'a> {
    Inline(&'a serde_json::Map<String, Value>),
    File(PathBuf),
}

/// Resolve a logical dataset to a frame plus its source descriptor.
pub fn resolve(
    spec: &DatasetSpec,
    inline: Option<&serde_json::Map<String, Value>>,
    cfg: &DataConfig,
) -> Result<(Frame, SourceTag), EngineError> {
    let mut providers: Vec<Provider<'_>> = Vec::with_capacity(3);
    if let Some(body) = inline {
        providers.push(Provider::Inline(body));
    }
    providers.push(Provider::File(cfg.local_dir.join(spec.file_name)));
    providers.push(Provider::File(cfg.shared_dir.join(spec.file_name)));

    let mut last_attempted = cfg.shared_dir.join(spec.file_name);

    for provider in providers {
        match provider {
            Provider::Inline(body) => {
                if spec.required_fields.iter().all(|f| body.contains_key(*f)) {
                    let frame = Frame::from_inline(body)?;
                    tracing::debug!(dataset = spec.logical_name, "resolved from request body");
                    return Ok((frame, SourceTag::Body));
                }
                // Partial body: fall through to the file providers.
            }
            Provider::File(path) => {
                if path.exists() {
                    let frame = Frame::from_csv(&path)?;
                    tracing::debug!(
                        dataset = spec.logical_name,
                        path = %path.display(),
                        "resolved from file"
                    );
                    return Ok((frame, SourceTag::File(path)));
                }
                last_attempted = path;
            }
        }
    }

    Err(EngineError::DatasetNotFound(last_attempted))
}
