//! race command - Create races, assign lanes and record results

use anyhow::{bail, Result};

use super::open_engine;
use crate::cli::Context;
use crate::core::lifecycle::Placement;
use crate::core::ranking::ValidationMode;
use crate::core::types::{RaceId, StudentId};
use crate::ui::output;

/// Create a race.
pub fn create(ctx: &Context, name: &str) -> Result<()> {
    let engine = open_engine(ctx)?;
    let race = engine.create_race(name)?;

    if ctx.json {
        return output::print_json(&race);
    }
    output::print(
        format!("Created race {}: {}", race.id, race.name),
        ctx.verbosity(),
    );
    Ok(())
}

/// List all races.
pub fn list(ctx: &Context) -> Result<()> {
    let engine = open_engine(ctx)?;
    let races = engine.list_races()?;

    if ctx.json {
        return output::print_json(&races);
    }
    output::print(output::format_races(&races), ctx.verbosity());
    Ok(())
}

/// Show one race with its lanes.
pub fn show(ctx: &Context, id: RaceId) -> Result<()> {
    let engine = open_engine(ctx)?;
    let race = engine.race(id)?;

    if ctx.json {
        return output::print_json(&race);
    }
    let students = engine.list_students()?;
    output::print(output::format_race(&race, &students), ctx.verbosity());
    Ok(())
}

/// Delete a race and its lanes.
pub fn delete(ctx: &Context, id: RaceId) -> Result<()> {
    let engine = open_engine(ctx)?;
    engine.delete_race(id)?;
    output::print(format!("Deleted race {}", id), ctx.verbosity());
    Ok(())
}

/// Assign a student to the next lane.
pub fn register(ctx: &Context, race: RaceId, student: StudentId) -> Result<()> {
    let engine = open_engine(ctx)?;
    let lane = engine.assign_student_to_lane(race, student)?;

    if ctx.json {
        return output::print_json(&lane);
    }
    output::print(
        format!(
            "Assigned student {} to lane {} (lane id {})",
            lane.student_id, lane.lane_number, lane.id
        ),
        ctx.verbosity(),
    );
    Ok(())
}

/// List students that can still be registered.
pub fn available(ctx: &Context, race: RaceId) -> Result<()> {
    let engine = open_engine(ctx)?;
    let students = engine.available_students(race)?;

    if ctx.json {
        return output::print_json(&students);
    }
    let next = engine.next_lane_number(race)?;
    output::print(output::format_students(&students), ctx.verbosity());
    if !students.is_empty() {
        output::print(format!("Next lane: {}", next), ctx.verbosity());
    }
    Ok(())
}

/// Close registration.
pub fn lock(ctx: &Context, id: RaceId) -> Result<()> {
    let engine = open_engine(ctx)?;
    let race = engine.lock_race(id)?;

    if ctx.json {
        return output::print_json(&race);
    }
    output::print(
        format!(
            "Race {} locked with {} participants",
            race.id,
            race.participant_count()
        ),
        ctx.verbosity(),
    );
    Ok(())
}

/// Run the full invariant check on a race.
pub fn verify(ctx: &Context, id: RaceId) -> Result<()> {
    let engine = open_engine(ctx)?;
    let result = engine.verify_race(id)?;

    if !result.ok {
        let problems: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
        bail!("race {} failed verification: {}", id, problems.join("; "));
    }
    output::print(format!("Race {} verified", id), ctx.verbosity());
    Ok(())
}

/// Record places and finalize.
pub fn results(
    ctx: &Context,
    id: RaceId,
    placements: &[Placement],
    mode: Option<ValidationMode>,
) -> Result<()> {
    let engine = open_engine(ctx)?;
    let race = match mode {
        Some(mode) => engine.record_results_with_mode(id, placements, mode)?,
        None => engine.record_results(id, placements)?,
    };

    if ctx.json {
        return output::print_json(&race);
    }
    let students = engine.list_students()?;
    output::print(
        format!("Race {} finalized\n{}", race.id, output::format_standings(&race, &students)),
        ctx.verbosity(),
    );
    Ok(())
}
