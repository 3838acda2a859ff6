//! Command dispatch.

pub mod serve;
pub mod snapshot;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(cmd: Option<Command>, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        None => serve::handle(crate::cli::ServeArgs::default(), global).await,
        Some(Command::Serve(args)) => serve::handle(args, global).await,
        Some(Command::Snapshot(args)) => snapshot::handle(args, global).await,
    }
}
