//! File-level operations on `.yaml` / `.crazy.yaml` documents.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Settings;
use crate::core::Node;
use crate::text::yaml;
use crate::tree;
use crate::util::{Error, Result};

/// Marker inserted before the extension of compressed files.
pub const CRAZY_MARKER: &str = ".crazy";

/// Read a YAML file, compress its long numeric sequences and write the
/// result to `output` with the header comment.
pub fn yaml_to_crazy(input: impl AsRef<Path>, output: impl AsRef<Path>, settings: &Settings) -> Result<()> {
    let input = input.as_ref();
    info!(input = %input.display(), "reading YAML");
    let text = std::fs::read_to_string(input)?;
    let doc = yaml::parse(&text)?;
    store_data_to_crazy(doc, output, settings)
}

/// Compress an in-memory document and write it as a `.crazy.yaml` file.
pub fn store_data_to_crazy(data: Node, output: impl AsRef<Path>, settings: &Settings) -> Result<()> {
    let output = output.as_ref();
    let packed = tree::compress_with(data, settings)?;
    std::fs::write(output, yaml::to_crazy_string(&packed))?;
    info!(output = %output.display(), blobs = packed.count_blobs(), "wrote compressed YAML");
    Ok(())
}

/// Read a `.crazy.yaml` file and inflate all blobs.
pub fn load_crazy(input: impl AsRef<Path>) -> Result<Node> {
    let input = input.as_ref();
    info!(input = %input.display(), "reading compressed YAML");
    let text = std::fs::read_to_string(input)?;
    tree::decompress(yaml::parse(&text)?)
}

/// Restore a `.crazy.yaml` file to plain YAML, rendering short flat
/// sequences in flow style.
pub fn crazy_to_yaml(input: impl AsRef<Path>, output: impl AsRef<Path>, settings: &Settings) -> Result<()> {
    let output = output.as_ref();
    let doc = tree::annotate(load_crazy(input)?, settings.flow_threshold);
    std::fs::write(output, yaml::to_string(&doc))?;
    info!(output = %output.display(), "wrote plain YAML");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// True if the file name contains the `.crazy` marker.
pub fn is_crazy_path(path: impl AsRef<Path>) -> bool {
    file_name(path.as_ref()).contains(CRAZY_MARKER)
}

/// Output name for compression: `data.yaml` -> `data.crazy.yaml`.
pub fn crazy_path_for(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, CRAZY_MARKER, ext.to_string_lossy()),
        None => format!("{}{}", stem, CRAZY_MARKER),
    };
    input.with_file_name(name)
}

/// Output name for decompression: the `.crazy` marker is removed.
pub fn plain_path_for(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let name = file_name(input).replace(CRAZY_MARKER, "");
    input.with_file_name(name)
}

/// Check the naming rules for a compression run.
pub fn check_compress_paths(input: &Path, output: &Path) -> Result<()> {
    if is_crazy_path(input) {
        return Err(Error::path(input, "input for to-crazy must not contain '.crazy'"));
    }
    if !is_crazy_path(output) {
        return Err(Error::path(output, "output for to-crazy must contain '.crazy'"));
    }
    Ok(())
}

/// Check the naming rules for a decompression run.
pub fn check_decompress_paths(input: &Path, output: &Path) -> Result<()> {
    if !is_crazy_path(input) {
        return Err(Error::path(input, "input for decompress must contain '.crazy'"));
    }
    if is_crazy_path(output) {
        return Err(Error::path(output, "output for decompress must not contain '.crazy'"));
    }
    Ok(())
}
