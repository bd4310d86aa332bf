//! Feature results and their text or JSON rendering.

use serde::Serialize;
use std::fmt::Write as _;

use timbre_analysis::Lpc;

/// One computed feature.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Subcommand name.
    pub feature: &'static str,
    #[serde(flatten)]
    pub body: Body,
}

/// Shape of a feature result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// A scalar. Non-finite values serialize as JSON `null`.
    Value { value: f64 },
    /// A vector of coefficients.
    Values { values: Vec<f64> },
    /// Frequency/magnitude pairs.
    Bins { bins: Vec<Bin> },
    /// Linear prediction model.
    Lpc {
        reflection: Vec<f64>,
        coefficients: Vec<f64>,
        error: f64,
    },
}

/// A frequency and its magnitude.
#[derive(Debug, Serialize)]
pub struct Bin {
    pub frequency: f64,
    pub magnitude: f64,
}

impl Report {
    pub fn value(feature: &'static str, value: f64) -> Self {
        Self {
            feature,
            body: Body::Value { value },
        }
    }

    pub fn values(feature: &'static str, values: Vec<f64>) -> Self {
        Self {
            feature,
            body: Body::Values { values },
        }
    }

    pub fn bins(feature: &'static str, bins: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            feature,
            body: Body::Bins {
                bins: bins
                    .into_iter()
                    .map(|(frequency, magnitude)| Bin {
                        frequency,
                        magnitude,
                    })
                    .collect(),
            },
        }
    }

    pub fn lpc(model: Lpc) -> Self {
        Self {
            feature: "lpc",
            body: Body::Lpc {
                reflection: model.reflection,
                coefficients: model.coefficients,
                error: model.error,
            },
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as plain text: one number per line, or tab-separated pairs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match &self.body {
            Body::Value { value } => {
                let _ = writeln!(out, "{value}");
            }
            Body::Values { values } => {
                for v in values {
                    let _ = writeln!(out, "{v}");
                }
            }
            Body::Bins { bins } => {
                for bin in bins {
                    let _ = writeln!(out, "{:.4}\t{}", bin.frequency, bin.magnitude);
                }
            }
            Body::Lpc {
                reflection,
                coefficients,
                error,
            } => {
                let _ = writeln!(out, "# reflection");
                for k in reflection {
                    let _ = writeln!(out, "{k}");
                }
                let _ = writeln!(out, "# coefficients");
                for a in coefficients {
                    let _ = writeln!(out, "{a}");
                }
                let _ = writeln!(out, "# error\n{error}");
            }
        }
        out
    }
}
