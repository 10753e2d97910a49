//! Proof-log artifact.
//!
//! Writes the human-readable trace for a run to
//! `<source basename>.cc.proof` next to the source module: a header
//! with the module name and generation timestamp, a summary of every
//! VC's outcome and timing, then one divider-delimited section per VC
//! showing the model before theorem application, each inserted
//! instantiation with its justification, and the final verdict line.

use crate::config::ProverConfig;
use crate::error::ProverResult;
use crate::result::{RunSummary, VcResult};
use std::path::{Path, PathBuf};

/// An 80-column `=`-filled divider with a centered label.
pub fn div_line(label: &str) -> String {
    let label: String = label.chars().take(77).collect();
    let padded = format!(" {} ", label);
    let mut div = ['='; 80];
    let start = 40usize.saturating_sub(padded.chars().count() / 2);
    for (j, ch) in padded.chars().enumerate() {
        if start + j < div.len() {
            div[start + j] = ch;
        }
    }
    let mut out: String = div.iter().collect();
    out.push('\n');
    out
}

/// Render one VC's section.
pub fn vc_section(result: &VcResult, show_unproved: bool) -> String {
    let div = div_line(&result.name);
    let mut out = div.clone();
    if result.proved || show_unproved {
        out.push_str(&format!(
            "Before application of theorems: {}\n",
            result.before
        ));
        for entry in &result.trace {
            out.push_str(&format!("[{}] {}\n  {}\n", entry.score, entry.theorem, entry.fact));
        }
    }
    if result.proved {
        out.push_str(&format!(
            "{} iterations. PROVED: VC {}\n",
            result.iterations, result.name
        ));
    } else if show_unproved {
        out.push_str(&format!(
            "\n{} iterations. NOT PROVED: VC {}\n",
            result.iterations, result.after
        ));
    } else {
        out.push_str(&format!(
            "{} iterations. NOT PROVED: VC {}\n",
            result.iterations, result.name
        ));
    }
    out.push_str(&div);
    out
}

/// Render the run summary section.
pub fn summary_section(summary: &RunSummary) -> String {
    let div = div_line("Summary");
    let mut out = div.clone();
    for result in &summary.results {
        let verdict = if result.proved {
            "Proved"
        } else {
            "Insufficient data to prove"
        };
        out.push_str(&format!(
            "{} {} time: {} ms\n",
            verdict, result.name, result.elapsed_ms
        ));
    }
    out.push_str(&div);
    out
}

/// Proof-log path for a source module: basename up to the first dot,
/// with the `.cc.proof` extension, beside the source.
pub fn proof_file_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("out");
    let stem = name.split('.').next().unwrap_or(name);
    source.with_file_name(format!("{}.cc.proof", stem))
}

/// Full text of the proof log.
pub fn render(module: &str, summary: &RunSummary, config: &ProverConfig) -> String {
    let mut out = format!(
        "Proofs for {} generated {}\n\n",
        module,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(&summary_section(summary));
    for result in &summary.results {
        out.push_str(&vc_section(result, config.show_results_if_not_proved));
    }
    out
}

/// Write the proof log next to `source`.
///
/// Failure here does not affect proof results; they remain available in
/// the summary and via listeners.
pub fn write_proof_file(
    source: &Path,
    module: &str,
    summary: &RunSummary,
    config: &ProverConfig,
) -> ProverResult<PathBuf> {
    let path = proof_file_path(source);
    std::fs::write(&path, render(module, summary, config))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_line_shape() {
        let div = div_line("Summary");
        assert_eq!(div.chars().count(), 81);
        assert!(div.contains(" Summary "));
        assert!(div.starts_with('='));
        assert!(div.trim_end().ends_with('='));
    }

    #[test]
    fn test_div_line_truncates_long_labels() {
        let long = "x".repeat(200);
        let div = div_line(&long);
        assert_eq!(div.chars().count(), 81);
    }

    #[test]
    fn test_proof_file_path_uses_first_dot() {
        let path = proof_file_path(Path::new("/tmp/Stack_Impl.fa.res"));
        assert_eq!(path, Path::new("/tmp/Stack_Impl.cc.proof"));
    }
}
