//! Welcome banner: figlet art shaded left to right from savannah orange to acacia green.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};

const BANNER_TEXT: &str = "WELFARE";

/// Savannah orange (#f28c28).
const SAVANNAH: (u8, u8, u8) = (0xf2, 0x8c, 0x28);
/// Acacia green (#2e8b57).
const ACACIA: (u8, u8, u8) = (0x2e, 0x8b, 0x57);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Colour of column `col` in a banner `width` columns wide.
fn column_color(col: usize, width: usize) -> Color {
    let t = if width <= 1 {
        0.0
    } else {
        col as f64 / (width - 1) as f64
    };
    let (r, g, b) = lerp_rgb(SAVANNAH, ACACIA, t);
    Color::Rgb { r, g, b }
}

/// Render the banner text; plain text if the font cannot be loaded.
fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(BANNER_TEXT).map(|f| f.to_string()))
        .unwrap_or_else(|| format!("{}\n", BANNER_TEXT))
}

/// `v<version> · <organization>` padded with a rule to at least `width` columns.
fn footer(organization: &str, width: usize) -> String {
    let label = format!(" v{} · {} ", env!("CARGO_PKG_VERSION"), organization);
    let rule = width.saturating_sub(label.chars().count() + 2);
    format!("──{}{}", label, "─".repeat(rule))
}

fn write_welcome(out: &mut impl Write, organization: &str) -> io::Result<()> {
    let art = banner_art();
    let lines: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for line in &lines {
        for (col, ch) in line.chars().enumerate() {
            if ch == ' ' {
                queue!(out, Print(ch))?;
            } else {
                queue!(out, SetForegroundColor(column_color(col, width)), Print(ch))?;
            }
        }
        queue!(out, ResetColor, Print("\r\n"))?;
    }

    queue!(
        out,
        SetForegroundColor(column_color(width.saturating_sub(1), width)),
        Print(footer(organization, width)),
        ResetColor,
        Print("\r\n\r\n")
    )?;
    out.flush()
}

/// Prints the banner. Terminal errors only cost the banner.
pub fn print_welcome(organization: &str) {
    if let Err(e) = write_welcome(&mut stdout(), organization) {
        tracing::debug!(error = %e, "could not draw banner");
    }
}
