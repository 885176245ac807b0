use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use match_cascade_core::{BoardLayout, CellCoord, ObstaclePlacement};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "match";
const TRANSFER_VERSION: &str = "v1";

/// Leading `domain:version` fields of every layout string.
pub(crate) const TRANSFER_HEADER: &str = "match:v1";
/// Separates the fields of a layout string.
const FIELD_DELIMITER: char = ':';

/// Writes `layout` as a one-line `match:v1:<cols>x<rows>:<payload>` string.
pub(crate) fn encode(layout: &BoardLayout) -> Result<String, LayoutTransferError> {
    let payload = SerializableLayout {
        holes: layout.holes.clone(),
        obstacles: layout.obstacles.clone(),
        symbol_count: layout.symbol_count,
        seed: layout.seed,
        preset: layout.preset.clone(),
    };
    let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        layout.columns, layout.rows
    ))
}

/// Reads a layout back from a string produced by [`encode`].
pub(crate) fn decode(value: &str) -> Result<BoardLayout, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let decoded: SerializableLayout =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    Ok(BoardLayout {
        columns,
        rows,
        holes: decoded.holes,
        obstacles: decoded.obstacles,
        symbol_count: decoded.symbol_count,
        seed: decoded.seed,
        preset: decoded.preset,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    #[serde(default)]
    holes: Vec<CellCoord>,
    #[serde(default)]
    obstacles: Vec<ObstaclePlacement>,
    symbol_count: u8,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    preset: Vec<String>,
}

/// Failures while reading or writing layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// Nothing but whitespace was supplied.
    #[error("layout string was empty")]
    EmptyPayload,
    /// No domain field.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// No version field.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// No `<cols>x<rows>` field.
    #[error("layout string is missing the board dimensions")]
    MissingDimensions,
    /// No payload field.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The domain field is not `match`.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version field is not `v1`.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The dimensions are malformed or zero.
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    /// The payload is not valid unpadded base64.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload JSON could not be written or read.
    #[error("could not process layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}
