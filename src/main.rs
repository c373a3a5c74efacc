use std::process::ExitCode;

use strchain::collections::DoublyLinkedList;
use strchain::error::ListResult;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    setup_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ListResult<()> {
    let mut list = DoublyLinkedList::new("Head")?;
    list.append("A")?;
    println!("{list}");

    // -1 marks a value that isn't in the list
    let position = list.find("Ba").map_or(-1, |index| index as i64);
    println!("{position}");

    let released = list.destroy();
    tracing::debug!(released, "released list");
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
