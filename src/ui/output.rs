//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.
//! Logs go to stderr, command output to stdout.

use std::collections::HashMap;
use std::fmt::{Display, Write as _};

use anyhow::Result;
use serde::Serialize;

use crate::core::model::{Lane, Race, Student};
use crate::core::types::StudentId;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a value as pretty JSON (always shown).
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per student: `<id>  <name>`.
pub fn format_students(students: &[Student]) -> String {
    if students.is_empty() {
        return "No students.".to_string();
    }
    let rows: Vec<String> = students
        .iter()
        .map(|s| format!("{:>4}  {}", s.id.to_string(), s.name))
        .collect();
    format_list(&rows, "")
}

/// One line per race: `<id>  <status>  <participants>  <name>`.
pub fn format_races(races: &[Race]) -> String {
    if races.is_empty() {
        return "No races.".to_string();
    }
    let rows: Vec<String> = races
        .iter()
        .map(|r| {
            format!(
                "{:>4}  {:<9}  {:>2} lanes  {}",
                r.id.to_string(),
                r.status.as_str(),
                r.participant_count(),
                r.name
            )
        })
        .collect();
    format_list(&rows, "")
}

fn student_name<'a>(names: &'a HashMap<StudentId, &'a str>, lane: &Lane) -> &'a str {
    names.get(&lane.student_id).copied().unwrap_or("?")
}

fn place_text(lane: &Lane) -> String {
    lane.student_place
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// A race with its lanes in lane order, followed by standings once places
/// are recorded.
pub fn format_race(race: &Race, students: &[Student]) -> String {
    let names: HashMap<StudentId, &str> =
        students.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut out = String::new();
    let _ = writeln!(out, "Race {}: {} [{}]", race.id, race.name, race.status);

    if race.lanes.is_empty() {
        out.push_str("  no lanes assigned");
        return out;
    }

    let _ = writeln!(out, "  {:<5} {:<8} {:<6} student", "lane", "lane id", "place");
    for lane in race.lanes_by_number() {
        let _ = writeln!(
            out,
            "  {:<5} {:<8} {:<6} {}",
            lane.lane_number.to_string(),
            lane.id.to_string(),
            place_text(lane),
            student_name(&names, lane)
        );
    }

    let standings = race.standings();
    if !standings.is_empty() {
        out.push_str("Standings:\n");
        out.push_str(&format_standings_rows(&standings, &names));
    }

    out.trim_end().to_string()
}

/// Placed lanes ordered by place.
pub fn format_standings(race: &Race, students: &[Student]) -> String {
    let names: HashMap<StudentId, &str> =
        students.iter().map(|s| (s.id, s.name.as_str())).collect();
    format_standings_rows(&race.standings(), &names)
        .trim_end()
        .to_string()
}

fn format_standings_rows(standings: &[&Lane], names: &HashMap<StudentId, &str>) -> String {
    let mut out = String::new();
    for lane in standings {
        let _ = writeln!(
            out,
            "  {:>3}. {} (lane {})",
            place_text(lane),
            student_name(names, lane),
            lane.lane_number
        );
    }
    out
}
