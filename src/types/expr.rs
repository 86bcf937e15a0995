//! Colour definitions: hex literals, `$references` and function calls.
//!
//! Bundle tokens may be derived from other tokens:
//!
//! - `darken($accent, 20%)` / `lighten($accent, 20%)`
//! - `saturate($accent, 20%)` / `desaturate($accent, 20%)`
//! - `mix($a, $b, 50%)`
//! - `alpha($accent, 50%)`
//!
//! Adjustments are relative to the remaining range, computed in HSL via the
//! `palette` crate.

use palette::{Hsl, IntoColor, Srgb};

use crate::error::{AngoraError, Result};
use crate::types::Colour;

/// A parsed colour definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ColourExpr {
    /// `#FF0000`
    Hex(String),
    /// `$gold`, stored without the sigil
    Reference(String),
    /// `darken($gold, 20%)`
    Call { func: ColourFn, args: Vec<ColourExpr> },
    /// `20%`, only valid as a call argument
    Percent(f32),
}

/// Built-in colour functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourFn {
    Darken,
    Lighten,
    Saturate,
    Desaturate,
    Mix,
    Alpha,
}

impl ColourFn {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "saturate" => Self::Saturate,
            "desaturate" => Self::Desaturate,
            "mix" => Self::Mix,
            "alpha" => Self::Alpha,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::Saturate => "saturate",
            Self::Desaturate => "desaturate",
            Self::Mix => "mix",
            Self::Alpha => "alpha",
        }
    }

    fn usage(self) -> String {
        match self {
            Self::Mix => "Usage: mix($a, $b, 50%)".to_string(),
            other => format!("Usage: {}($colour, 20%)", other.name()),
        }
    }
}

impl ColourExpr {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(parse_error("Empty colour definition", None));
        }

        if input.starts_with('#') {
            return Ok(Self::Hex(input.to_string()));
        }

        if let Some(number) = input.strip_suffix('%') {
            let invalid = || {
                parse_error(
                    format!("Invalid percentage: {}", input),
                    Some("Use a form like 20% or 12.5%".to_string()),
                )
            };
            let value: f32 = number.trim().parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            return Ok(Self::Percent(value));
        }

        if let Some(open) = input.find('(') {
            let Some(inner) = input[open + 1..].strip_suffix(')') else {
                return Err(parse_error(
                    format!("Unclosed function call: {}", input),
                    Some("Add the closing parenthesis".to_string()),
                ));
            };
            let name = input[..open].trim();
            let func = ColourFn::from_name(name).ok_or_else(|| {
                parse_error(
                    format!("Unknown colour function: {}", name),
                    Some(
                        "Available functions: darken, lighten, saturate, desaturate, mix, alpha"
                            .to_string(),
                    ),
                )
            })?;
            let args = split_args(inner)?
                .into_iter()
                .map(ColourExpr::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::Call { func, args });
        }

        // Bare names are treated as references too.
        let name = input.strip_prefix('$').unwrap_or(input);
        Ok(Self::Reference(name.to_string()))
    }

    /// Names of every token this definition refers to, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Reference(name) => out.push(name),
            Self::Call { args, .. } => args.iter().for_each(|a| a.collect_references(out)),
            Self::Hex(_) | Self::Percent(_) => {}
        }
    }

    /// Evaluate to a colour, resolving references through `lookup`.
    pub fn eval<F>(&self, lookup: &mut F) -> Result<Colour>
    where
        F: FnMut(&str) -> Result<Colour>,
    {
        match self {
            Self::Hex(hex) => Colour::from_hex(hex),
            Self::Reference(name) => lookup(name),
            Self::Percent(_) => Err(parse_error(
                "A percentage is not a colour",
                Some("Percentages are only valid as function arguments".to_string()),
            )),
            Self::Call { func, args } => eval_call(*func, args, lookup),
        }
    }
}

fn eval_call<F>(func: ColourFn, args: &[ColourExpr], lookup: &mut F) -> Result<Colour>
where
    F: FnMut(&str) -> Result<Colour>,
{
    let expected = if func == ColourFn::Mix { 3 } else { 2 };
    if args.len() != expected {
        return Err(parse_error(
            format!(
                "{}() takes {} arguments, got {}",
                func.name(),
                expected,
                args.len()
            ),
            Some(func.usage()),
        ));
    }

    let base = args[0].eval(lookup)?;
    let ratio = match &args[expected - 1] {
        ColourExpr::Percent(p) => p / 100.0,
        _ => {
            return Err(parse_error(
                format!("{}() needs a percentage as its last argument", func.name()),
                Some(func.usage()),
            ))
        }
    };

    Ok(match func {
        ColourFn::Darken => adjust_hsl(base, |hsl| hsl.lightness = shift(hsl.lightness, -ratio)),
        ColourFn::Lighten => adjust_hsl(base, |hsl| hsl.lightness = shift(hsl.lightness, ratio)),
        ColourFn::Saturate => {
            adjust_hsl(base, |hsl| hsl.saturation = shift(hsl.saturation, ratio))
        }
        ColourFn::Desaturate => {
            adjust_hsl(base, |hsl| hsl.saturation = shift(hsl.saturation, -ratio))
        }
        ColourFn::Mix => mix(base, args[1].eval(lookup)?, ratio),
        ColourFn::Alpha => Colour::new(
            base.r,
            base.g,
            base.b,
            (ratio * 255.0).round().clamp(0.0, 255.0) as u8,
        ),
    })
}

/// Move `value` toward 1.0 (positive delta) or 0.0 (negative delta).
fn shift(value: f32, delta: f32) -> f32 {
    let moved = if delta > 0.0 {
        value + (1.0 - value) * delta
    } else {
        value + value * delta
    };
    moved.clamp(0.0, 1.0)
}

fn adjust_hsl(colour: Colour, edit: impl FnOnce(&mut Hsl)) -> Colour {
    let rgb: Srgb<f32> = Srgb::new(colour.r, colour.g, colour.b).into_format();
    let mut hsl: Hsl = rgb.into_color();
    edit(&mut hsl);
    let out: Srgb<f32> = hsl.into_color();
    let out: Srgb<u8> = out.into_format();
    Colour::new(out.red, out.green, out.blue, colour.a)
}

fn mix(a: Colour, b: Colour, factor: f32) -> Colour {
    let t = factor.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| (x as f32 * (1.0 - t) + y as f32 * t).round() as u8;
    Colour::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b), lerp(a.a, b.a))
}

/// Split call arguments on top-level commas.
fn split_args(input: &str) -> Result<Vec<&str>> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return Err(parse_error(format!("Unbalanced parentheses in: {}", input), None));
        }
    }
    if depth != 0 {
        return Err(parse_error(format!("Unbalanced parentheses in: {}", input), None));
    }

    let last = input[start..].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }
    if args.iter().any(|a| a.is_empty()) {
        return Err(parse_error(format!("Empty argument in: {}", input), None));
    }
    Ok(args)
}

fn parse_error(message: impl Into<String>, help: Option<String>) -> AngoraError {
    AngoraError::Parse {
        message: message.into(),
        help,
    }
}
