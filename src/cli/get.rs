use std::path::PathBuf;

use clap::Args;

use crate::discovery::discover_args;
use crate::error::{AngoraError, Result};
use crate::output::Printer;

use super::start_session;

/// Print the value of one token after loading bundles
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Token name, with or without a leading `$`
    pub token: String,

    /// Bundle files or directories, in load order
    pub paths: Vec<PathBuf>,
}

pub fn run(args: GetArgs, printer: &Printer) -> Result<()> {
    let discovery = discover_args(&args.paths)?;
    let session = start_session(&discovery, None, printer)?;

    match session.registry.get(&args.token) {
        Some(colour) => {
            println!("{}", colour);
            Ok(())
        }
        None => Err(AngoraError::Validation {
            message: format!("Token '{}' is not set", args.token.trim_start_matches('$')),
            help: Some(format!(
                "{} tokens are loaded; run `angora load` to list them",
                session.registry.len()
            )),
        }),
    }
}
