//! CLI output formatting.
//!
//! Each delivered artifact gets a header line (positional index, name,
//! dimensions, size) and an indented line saying where it went:
//!
//! ```text
//! 001 50-cmp-2.0-cat.jpg (160x120, 12.4 KB)
//!     → out/50-cmp-2.0-cat.jpg
//! 002 50-cmp-100,100-cat.jpg (100x100, 6.1 KB)
//!     → https://bucket.s3.amazonaws.com/thumbs/50-cmp-100,100-cat.jpg
//!
//! Delivered 2 images (18.5 KB)
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers write
//! them to stdout.

use crate::job::{Delivered, Location};

/// Format a 1-based position as a zero-padded 3-digit string.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count: `512 B`, `12.4 KB`, `3.0 MB`.
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

fn format_location(location: &Location) -> String {
    match location {
        Location::File(path) => path.display().to_string(),
        Location::Url(url) => url.clone(),
    }
}

/// Lines describing every delivered artifact, followed by a summary.
pub fn format_delivered(delivered: &[Delivered]) -> Vec<String> {
    let mut lines = Vec::with_capacity(delivered.len() * 2 + 2);

    for (i, item) in delivered.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}x{}, {})",
            format_index(i + 1),
            item.name,
            item.width,
            item.height,
            format_bytes(item.bytes)
        ));
        lines.push(format!("    → {}", format_location(&item.location)));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let total: usize = delivered.iter().map(|d| d.bytes).sum();
    let noun = if delivered.len() == 1 { "image" } else { "images" };
    lines.push(format!(
        "Delivered {} {noun} ({})",
        delivered.len(),
        format_bytes(total)
    ));
    lines
}

pub fn print_delivered(delivered: &[Delivered]) {
    for line in format_delivered(delivered) {
        println!("{}", line);
    }
}
