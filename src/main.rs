use std::process::ExitCode;

use racekeeper::ui::output;

fn main() -> ExitCode {
    match racekeeper::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
