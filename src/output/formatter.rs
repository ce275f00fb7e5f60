//! Output formatting

use crate::config::OsRegistry;
use crate::dispatch::Plan;
use crate::output::human::format_human;
use crate::output::json::format_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Something a subcommand prints.
#[derive(Debug)]
pub enum Report<'a> {
    Profiles(&'a OsRegistry),
    Plan(&'a Plan),
}

pub fn format_output(report: &Report<'_>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
