//! student command - Manage the student directory

use anyhow::Result;

use super::open_engine;
use crate::cli::Context;
use crate::ui::output;

/// Add a student.
pub fn add(ctx: &Context, name: &str) -> Result<()> {
    let engine = open_engine(ctx)?;
    let student = engine.register_student(name)?;

    if ctx.json {
        return output::print_json(&student);
    }
    output::print(
        format!("Added student {}: {}", student.id, student.name),
        ctx.verbosity(),
    );
    Ok(())
}

/// List all students.
pub fn list(ctx: &Context) -> Result<()> {
    let engine = open_engine(ctx)?;
    let students = engine.list_students()?;

    if ctx.json {
        return output::print_json(&students);
    }
    output::print(output::format_students(&students), ctx.verbosity());
    Ok(())
}
