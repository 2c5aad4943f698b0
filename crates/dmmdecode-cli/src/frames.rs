use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use glob::glob;

use crate::CliError;

/// Path that selects stdin for `replay`.
pub const STDIN_PATH: &str = "-";

/// One hex frame and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    /// `file:line` or `arg N`, for log messages.
    pub origin: String,
    pub hex: String,
}

pub fn frames_from_args(frames: &[String]) -> Vec<FrameLine> {
    frames
        .iter()
        .enumerate()
        .map(|(index, hex)| FrameLine {
            origin: format!("arg {}", index + 1),
            hex: hex.trim().to_string(),
        })
        .collect()
}

/// Frames from a capture log: one hex frame per line, blank lines and `#`
/// comments skipped. Lines are read lazily so a live pipe is decoded as it
/// arrives.
///
/// Lines are read as raw bytes. A line that is not UTF-8 is still yielded,
/// lossily converted, so the decoder rejects it as a malformed frame and the
/// lines after it are still read.
pub struct FrameLines<R> {
    reader: R,
    source: String,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> FrameLines<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            reader,
            source: source.into(),
            line_no: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for FrameLines<R> {
    type Item = io::Result<FrameLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err)),
            }
            self.line_no += 1;
            let line = String::from_utf8_lossy(&self.buf);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(Ok(FrameLine {
                origin: format!("{}:{}", self.source, self.line_no),
                hex: trimmed.to_string(),
            }));
        }
    }
}

/// Expand a capture path or glob pattern into existing files, sorted.
pub fn resolve_input_paths(input: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        if !input.is_file() {
            return Err(CliError::new(
                format!("input file not found: {}", input.display()),
                Some("pass a frame log (one hex frame per line) or '-' for stdin".to_string()),
            ));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    matches.sort();
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
