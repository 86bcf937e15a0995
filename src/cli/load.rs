use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::discovery::discover_args;
use crate::error::{AngoraError, Result};
use crate::output::{palette_lines, plural, Printer};
use crate::types::Palette;

use super::start_session;

/// Load bundles and print the merged palette
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Bundle files or directories, in load order (default: angora.yaml or current directory)
    pub paths: Vec<PathBuf>,

    /// Also write the published palette to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// How to print the palette on stdout
    #[arg(long, value_enum, default_value_t = Format::Lines)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `$name: #HEX` per line
    Lines,
    /// A JSON object of name to hex
    Json,
}

pub fn run(args: LoadArgs, printer: &Printer) -> Result<()> {
    let discovery = discover_args(&args.paths)?;
    let session = start_session(&discovery, args.json, printer)?;

    let palette = session.registry.snapshot();
    print!("{}", render(&palette, args.format)?);

    printer.success(
        "Published",
        &format!(
            "{} from {}",
            plural(palette.len(), "token", "tokens"),
            plural(discovery.files.len(), "file", "files")
        ),
    );

    Ok(())
}

fn render(palette: &Palette, format: Format) -> Result<String> {
    match format {
        Format::Lines => Ok(palette_lines(palette)),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(palette).map_err(|e| AngoraError::Parse {
                message: format!("Failed to serialize palette: {}", e),
                help: None,
            })?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;
    use pretty_assertions::assert_eq;

    fn palette() -> Palette {
        Palette::from_iter([("ink", Colour::BLACK), ("paper", Colour::WHITE)])
    }

    #[test]
    fn test_render_lines() {
        assert_eq!(
            render(&palette(), Format::Lines).unwrap(),
            "$ink: #000000\n$paper: #FFFFFF\n"
        );
    }

    #[test]
    fn test_render_json() {
        let out = render(&palette(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"ink": "#000000", "paper": "#FFFFFF"}));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Palette::new(), Format::Lines).unwrap(), "");
        assert_eq!(render(&Palette::new(), Format::Json).unwrap(), "{}\n");
    }
}
