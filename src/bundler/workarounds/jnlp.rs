//! Rewriting of generated webstart descriptors.
//!
//! Descriptors are treated as plain text. Only `href` and `size` attribute
//! values of `<jar>` lines are interpreted, everything else (including line
//! endings) is written back byte for byte.

use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::utils::fs;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Pattern of a descriptor line referencing a jar with its size.
pub const JNLP_JAR_PATTERN: &str = r#"(.*)href=(".*?")(.*)size=(".*?")(.*)"#;

const JAR_LINE_PREFIX: &str = "<jar href=";

/// Finds every `.jnlp` file below `output_dir`.
pub async fn find_descriptors(output_dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(fs::list_files(output_dir)
        .await?
        .into_iter()
        .filter(|f| f.extension().is_some_and(|e| e == "jnlp"))
        .map(|f| output_dir.join(f))
        .collect())
}

fn is_jar_line(line: &str) -> bool {
    line.trim().starts_with(JAR_LINE_PREFIX)
}

/// Splits a line into its content and its line terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    let body = line.trim_end_matches(['\r', '\n']);
    line.split_at(body.len())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Lists the jars referenced by a descriptor, resolved against its folder.
pub async fn referenced_jars(descriptor: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(JNLP_JAR_PATTERN)?;
    let content = tokio::fs::read_to_string(descriptor)
        .await
        .fs_context("reading descriptor file", descriptor)?;
    let base = descriptor.parent().unwrap_or(Path::new("."));

    Ok(content
        .lines()
        .filter(|line| is_jar_line(line))
        .filter_map(|line| pattern.captures(line))
        .map(|caps| base.join(unquote(&caps[2])))
        .collect())
}

/// Replaces backslashes with slashes in every `<jar href=...>` line.
///
/// Returns whether the descriptor changed.
pub async fn fix_path_separators(descriptor: &Path) -> Result<bool> {
    let content = tokio::fs::read_to_string(descriptor)
        .await
        .fs_context("reading descriptor file", descriptor)?;

    let mut changed = false;
    let rewritten: String = content
        .split_inclusive('\n')
        .map(|line| {
            if is_jar_line(line) && line.contains('\\') {
                changed = true;
                line.replace('\\', "/")
            } else {
                line.to_string()
            }
        })
        .collect();

    if changed {
        tokio::fs::write(descriptor, rewritten)
            .await
            .fs_context("writing descriptor file", descriptor)?;
    }
    Ok(changed)
}

/// Updates the declared `size` of every referenced jar to its size on disk.
///
/// Only the size value changes. Lines whose jar does not exist are kept as
/// they are. Returns the number of rewritten lines.
pub async fn recalculate_sizes(descriptor: &Path) -> Result<usize> {
    let pattern = Regex::new(JNLP_JAR_PATTERN)?;
    let content = tokio::fs::read_to_string(descriptor)
        .await
        .fs_context("reading descriptor file", descriptor)?;
    let base = descriptor.parent().unwrap_or(Path::new("."));

    let mut rewritten = String::with_capacity(content.len());
    let mut updated = 0;
    for line in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        let Some(caps) = pattern.captures(body) else {
            rewritten.push_str(line);
            continue;
        };
        let jar = base.join(unquote(&caps[2]));
        let size = match tokio::fs::metadata(&jar).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::warn!("Couldn't determine size of {}: {e}", jar.display());
                rewritten.push_str(line);
                continue;
            }
        };
        let size = format!("\"{size}\"");
        if size != caps[4] {
            updated += 1;
        }
        rewritten.push_str(&caps[1]);
        rewritten.push_str("href=");
        rewritten.push_str(&caps[2]);
        rewritten.push_str(&caps[3]);
        rewritten.push_str("size=");
        rewritten.push_str(&size);
        rewritten.push_str(&caps[5]);
        rewritten.push_str(terminator);
    }

    if updated > 0 {
        tokio::fs::write(descriptor, rewritten)
            .await
            .fs_context("writing descriptor file", descriptor)?;
    }
    Ok(updated)
}
