//! Supported engines and TeX distribution detection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::error::ToolError;
use crate::runner::{CommandRunner, Invocation};

/// Engine identifiers accepted in compile requests, in the order they are
/// advertised to clients.
pub const SUPPORTED_ENGINES: &[&str] = &["pdflatex", "lualatex", "xelatex", "bibtex", "biber"];

/// A TeX engine or bibliography processor this server knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Pdflatex,
    Lualatex,
    Xelatex,
    Bibtex,
    Biber,
}

impl Engine {
    /// Executable name on `PATH`.
    pub fn program(self) -> &'static str {
        match self {
            Engine::Pdflatex => "pdflatex",
            Engine::Lualatex => "lualatex",
            Engine::Xelatex => "xelatex",
            Engine::Bibtex => "bibtex",
            Engine::Biber => "biber",
        }
    }
}

impl FromStr for Engine {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdflatex" => Ok(Engine::Pdflatex),
            "lualatex" => Ok(Engine::Lualatex),
            "xelatex" => Ok(Engine::Xelatex),
            "bibtex" => Ok(Engine::Bibtex),
            "biber" => Ok(Engine::Biber),
            other => Err(ToolError::InvalidInput(format!(
                "Unsupported engine: {other}"
            ))),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A TeX distribution found on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexDistribution {
    TexLive,
    Miktex,
}

impl fmt::Display for TexDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TexDistribution::TexLive => f.write_str("texlive"),
            TexDistribution::Miktex => f.write_str("miktex"),
        }
    }
}

/// Wall-clock budget for the `tex --version` probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes the host for an installed TeX distribution.
///
/// Asks `tex --version` first and sniffs its banner, then falls back to
/// well-known install prefixes when the binary is missing or unresponsive.
/// Returns `None` when nothing is found; compilation tools then fail at
/// spawn time with their own errors.
pub async fn detect_distribution(runner: &dyn CommandRunner) -> Option<TexDistribution> {
    if which::which("tex").is_ok() {
        let probe = Invocation {
            program: "tex".to_string(),
            args: vec!["--version".to_string()],
            workdir: PathBuf::from("."),
            timeout: PROBE_TIMEOUT,
        };
        match runner.run(&probe).await {
            Ok(output) => {
                if let Some(distribution) = classify_banner(&output.stdout) {
                    return Some(distribution);
                }
            }
            Err(err) => warn!("tex --version probe failed: {err}"),
        }
    }
    detect_by_path()
}

fn classify_banner(banner: &str) -> Option<TexDistribution> {
    if banner.contains("TeX Live") {
        Some(TexDistribution::TexLive)
    } else if banner.contains("MiKTeX") {
        Some(TexDistribution::Miktex)
    } else {
        None
    }
}

#[cfg(windows)]
fn detect_by_path() -> Option<TexDistribution> {
    if Path::new("C:/texlive").exists() {
        Some(TexDistribution::TexLive)
    } else if Path::new("C:/Program Files/MiKTeX").exists()
        || Path::new("C:/Program Files (x86)/MiKTeX").exists()
    {
        Some(TexDistribution::Miktex)
    } else {
        None
    }
}

#[cfg(not(windows))]
fn detect_by_path() -> Option<TexDistribution> {
    if Path::new("/usr/local/texlive").exists() || Path::new("/opt/texlive").exists() {
        Some(TexDistribution::TexLive)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_engine() {
        for name in SUPPORTED_ENGINES {
            let engine: Engine = name.parse().unwrap();
            assert_eq!(engine.program(), *name);
        }
    }

    #[test]
    fn rejects_unknown_engine_with_its_name() {
        let err = "latexmk".parse::<Engine>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Unsupported engine: latexmk");
    }

    #[test]
    fn classifies_version_banners() {
        let texlive = "TeX 3.141592653 (TeX Live 2024)\nkpathsea version 6.3.5";
        let miktex = "MiKTeX-TeX 4.10 (MiKTeX 24.1)";
        assert_eq!(classify_banner(texlive), Some(TexDistribution::TexLive));
        assert_eq!(classify_banner(miktex), Some(TexDistribution::Miktex));
        assert_eq!(classify_banner("tex (Web2C)"), None);
    }
}
