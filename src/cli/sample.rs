use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use image::RgbaImage;

use crate::error::{AngoraError, Result};
use crate::output::{display_path, plural, Printer};
use crate::parser::Bundle;
use crate::types::Colour;

/// Seed a bundle from the most common colours of a PNG
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Image to sample colours from
    #[arg(required = true)]
    pub file: PathBuf,

    /// Maximum number of colours to keep
    #[arg(long)]
    pub max: Option<usize>,

    /// Bundle name (default: the file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Token name prefix
    #[arg(long, default_value = "sample")]
    pub prefix: String,
}

pub fn run(args: SampleArgs, printer: &Printer) -> Result<()> {
    let path = &args.file;

    let img = image::open(path)
        .map_err(|e| AngoraError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?
        .to_rgba8();

    let colours = sample_colours(&img, args.max);
    printer.status(
        "Sampled",
        &format!(
            "{} from {}",
            plural(colours.len(), "colour", "colours"),
            display_path(path)
        ),
    );

    let name = args.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sampled".to_string())
    });
    let bundle = sampled_bundle(&name, &args.prefix, &colours);

    let yaml = serde_yaml::to_string(&bundle).map_err(|e| AngoraError::Parse {
        message: format!("Failed to serialize bundle: {}", e),
        help: None,
    })?;
    print!("{}", yaml);

    Ok(())
}

/// Distinct colours by pixel count, most common first. Fully transparent
/// pixels are skipped; ties are broken by hex value so output is stable.
pub fn sample_colours(img: &RgbaImage, max: Option<usize>) -> Vec<Colour> {
    let mut counts: HashMap<[u8; 4], usize> = HashMap::new();
    for pixel in img.pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        *counts.entry(pixel.0).or_insert(0) += 1;
    }

    let mut ranked: Vec<([u8; 4], usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    if let Some(max) = max {
        ranked.truncate(max);
    }

    ranked
        .into_iter()
        .map(|(rgba, _)| Colour::new(rgba[0], rgba[1], rgba[2], rgba[3]))
        .collect()
}

/// A bundle with one token per colour: `prefix-01`, `prefix-02`, ...
pub fn sampled_bundle(name: &str, prefix: &str, colours: &[Colour]) -> Bundle {
    let width = colours.len().to_string().len().max(2);
    colours
        .iter()
        .enumerate()
        .fold(Bundle::new(name), |bundle, (i, colour)| {
            bundle.with_color(format!("{}-{:0width$}", prefix, i + 1), colour.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn test_image() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        img.put_pixel(2, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(3, 0, Rgba([0, 0, 0, 0]));
        img
    }

    #[test]
    fn test_sample_orders_by_frequency_then_value() {
        let colours = sample_colours(&test_image(), None);
        assert_eq!(
            colours,
            vec![
                Colour::rgb(255, 0, 0),
                Colour::rgb(0, 0, 255),
                Colour::rgb(0, 255, 0),
            ]
        );
    }

    #[test]
    fn test_sample_respects_max() {
        assert_eq!(sample_colours(&test_image(), Some(1)), vec![Colour::rgb(255, 0, 0)]);
    }

    #[test]
    fn test_sampled_bundle_names() {
        let bundle = sampled_bundle("sprite", "ui", &[Colour::BLACK, Colour::WHITE]);
        assert_eq!(bundle.name, "sprite");
        assert_eq!(bundle.colors.get("ui-01").map(String::as_str), Some("#000000"));
        assert_eq!(bundle.colors.get("ui-02").map(String::as_str), Some("#FFFFFF"));
    }

    #[test]
    fn test_sampled_bundle_round_trips_through_loader() {
        let bundle = sampled_bundle("sprite", "s", &[Colour::new(1, 2, 3, 128)]);
        let yaml = serde_yaml::to_string(&bundle).unwrap();
        let parsed = crate::parser::parse_bundles(&yaml).unwrap();
        assert_eq!(parsed, vec![bundle]);
    }

    #[test]
    fn test_run_reads_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sprite.png");
        test_image().save(&path).unwrap();

        let args = SampleArgs {
            file: path,
            max: Some(2),
            name: None,
            prefix: "sample".to_string(),
        };
        assert!(run(args, &Printer::with_color(false)).is_ok());
    }

    #[test]
    fn test_run_missing_file() {
        let args = SampleArgs {
            file: PathBuf::from("/nonexistent/sprite.png"),
            max: None,
            name: None,
            prefix: "sample".to_string(),
        };
        let err = run(args, &Printer::with_color(false)).unwrap_err();
        assert!(matches!(err, AngoraError::Io { .. }));
    }
}
