use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleLines {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

/// Extracts the first element set from TLE text.
///
/// Accepts both the 2-line form and the 3-line form with a leading name;
/// lines that belong to neither are skipped.
pub fn parse_tle(content: &str) -> Result<TleLines> {
    parse_multi_tle(content)
        .into_iter()
        .next()
        .ok_or_else(|| Error::config("no two-line element set found"))
}

pub fn read_tle_file(path: &Path) -> Result<TleLines> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read TLE file {}: {}", path.display(), e)))?;
    parse_tle(&content).map_err(|e| match e {
        Error::Configuration(msg) => {
            Error::Configuration(format!("{} in {}", msg, path.display()))
        }
        other => other,
    })
}

fn parse_multi_tle(content: &str) -> Vec<TleLines> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(TleLines {
                name: None,
                line1: lines[i].to_string(),
                line2: lines[i + 1].to_string(),
            });
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push(TleLines {
                name: Some(lines[i].to_string()),
                line1: lines[i + 1].to_string(),
                line2: lines[i + 2].to_string(),
            });
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

#[cfg(test)]
pub(crate) const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   21073.51041667  .00001264  00000-0  29621-4 0  9990
2 25544  51.6462  21.4372 0002187  80.3702  37.2822 15.48915322273627";
