//! Directory-change command recognition

use std::sync::OnceLock;

use regex::Regex;

/// `cd <path>` where the path is made of alphanumerics, `.`, `+`, `~`, `/`.
const CD_PATTERN: &str = r"^\s*cd\s+([A-Za-z0-9.+~/]+)\s*$";

fn cd_regex() -> &'static Regex {
    static CD: OnceLock<Regex> = OnceLock::new();
    CD.get_or_init(|| Regex::new(CD_PATTERN).expect("cd pattern is valid"))
}

fn separators_regex() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new("/{2,}").expect("separator pattern is valid"))
}

/// Target of a directory-change command, with repeated separators
/// collapsed. `None` if `cmd` is not one.
pub fn parse_cd(cmd: &str) -> Option<String> {
    let caps = cd_regex().captures(cmd)?;
    Some(collapse_separators(&caps[1]))
}

/// `a//b///c` -> `a/b/c`
fn collapse_separators(path: &str) -> String {
    separators_regex().replace_all(path, "/").into_owned()
}
