//! Reading sample frames from files or stdin.

use anyhow::{Context, bail};
use std::io::Read;
use std::path::Path;

/// Read a frame from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_frame(path: Option<&Path>) -> anyhow::Result<Vec<f64>> {
    let text = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input '{}'", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read samples from stdin")?;
            text
        }
    };
    parse_samples(&text)
}

/// Parse whitespace- or comma-separated numbers.
pub fn parse_samples(text: &str) -> anyhow::Result<Vec<f64>> {
    let mut samples = Vec::new();
    for (index, token) in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        let value: f64 = token
            .parse()
            .with_context(|| format!("sample {index} ('{token}') is not a number"))?;
        if !value.is_finite() {
            bail!("sample {index} ('{token}') is not finite");
        }
        samples.push(value);
    }
    Ok(samples)
}
