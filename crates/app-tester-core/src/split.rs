//! Input splitting for parallel runs
//!
//! A large application list is cut into N files so N independent runs can
//! process them, each with its own workdir. Their outputs are recombined
//! with a union merge afterwards.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::{ConfigError, Result, TesterError};

/// Cut `items` into `count` contiguous chunks. The first `count - 1` chunks
/// hold `len / count` items each; the last one takes the rest.
pub fn split_input(items: Vec<Value>, count: usize) -> Result<Vec<Vec<Value>>> {
    if count == 0 {
        return Err(ConfigError::InvalidValue {
            field: "split_count".to_string(),
            message: "must be at least 1".to_string(),
        }
        .into());
    }

    let per_file = items.len() / count;
    let mut rest = items;
    let mut chunks = Vec::with_capacity(count);

    for _ in 0..count - 1 {
        let tail = rest.split_off(per_file);
        chunks.push(rest);
        rest = tail;
    }
    chunks.push(rest);

    Ok(chunks)
}

/// Split the JSON array at `input` into `input_1.json`..`input_N.json`
/// inside `out_dir`
pub fn write_splits(input: &Path, count: usize, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(TesterError::InputNotFound(input.to_path_buf()));
    }

    let content = std::fs::read_to_string(input)?;
    let items: Vec<Value> = serde_json::from_str(&content)?;
    let total = items.len();

    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(count);
    for (i, chunk) in split_input(items, count)?.into_iter().enumerate() {
        let path = out_dir.join(format!("input_{}.json", i + 1));
        std::fs::write(&path, serde_json::to_string_pretty(&chunk)?)?;
        written.push(path);
    }

    info!(total, files = count, "input split");
    Ok(written)
}
