use crate::contract::BindingContract;
use crate::error::{AngoraError, Result};

pub fn run() -> Result<()> {
    let json = serde_json::to_string_pretty(&BindingContract::current()).map_err(|e| {
        AngoraError::Parse {
            message: format!("Failed to serialize contract: {}", e),
            help: None,
        }
    })?;
    println!("{}", json);
    Ok(())
}
