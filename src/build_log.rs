//! Build log classification
//!
//! A build that completes without a daemon error can still have produced a
//! broken image. The build output is scanned line by line for failure terms
//! before a container is ever started from it.

/// Outcome of scanning a build log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildLogVerdict {
    Pass,
    Fail,
}

impl BuildLogVerdict {
    pub fn is_pass(self) -> bool {
        self == BuildLogVerdict::Pass
    }
}

/// Returns true when a single log line signals a failed build.
///
/// Matching is case-insensitive. Any line mentioning "error" fails; a line
/// mentioning "failed" fails unless the same line also mentions "optional".
pub fn line_signals_failure(line: &str) -> bool {
    let line = line.to_lowercase();
    line.contains("error") || (line.contains("failed") && !line.contains("optional"))
}

/// Classifies a whole build log. An empty log passes.
pub fn classify<I, S>(lines: I) -> BuildLogVerdict
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if lines
        .into_iter()
        .any(|line| line_signals_failure(line.as_ref()))
    {
        BuildLogVerdict::Fail
    } else {
        BuildLogVerdict::Pass
    }
}
