// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clip time codes.
//!
//! Row offsets are stored as seconds and edited as `mm:ss.ff` text
//! (minutes, seconds, hundredths). Parsing never fails: anything that
//! is not a well-formed time code reads as zero.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_TIME: Regex = Regex::new(r"^(\d{1,2}):(\d{2})(?:\.(\d{0,2}))?$").unwrap();
}

/// Display value for anything that is not a usable number of seconds
pub const ZERO_TIME: &str = "00:00.00";

/// Render seconds as `mm:ss.ff`.
///
/// Non-finite and negative inputs render as [`ZERO_TIME`].
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return ZERO_TIME.to_string();
    }

    // Truncate to whole hundredths; the epsilon absorbs binary
    // representation error (0.29 * 100 = 28.999...).
    let hundredths = (seconds * 100.0 + 1e-6).floor() as u64;
    let mins = hundredths / 6000;
    let secs = (hundredths / 100) % 60;
    let frac = hundredths % 100;

    format!("{:02}:{:02}.{:02}", mins, secs, frac)
}

/// Check whether text is a syntactically valid time code.
///
/// This is the shape check only; it does not reject `secs >= 60`.
pub fn is_time_format(text: &str) -> bool {
    RE_TIME.is_match(text)
}

/// Parse `m:ss`, `mm:ss`, `mm:ss.f` or `mm:ss.ff` into seconds.
///
/// Returns `0.0` for malformed text and for seconds of 60 or more.
/// A one-digit fraction is read as tenths (`.5` is 50 hundredths).
pub fn parse_time(text: &str) -> f64 {
    let Some(caps) = RE_TIME.captures(text) else {
        return 0.0;
    };

    let mins: u64 = caps[1].parse().unwrap_or(0);
    let secs: u64 = caps[2].parse().unwrap_or(0);
    if secs >= 60 {
        return 0.0;
    }

    let frac = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    let frac: u64 = format!("{:0<2}", frac).parse().unwrap_or(0);

    let hundredths = mins * 6000 + secs * 100 + frac;
    hundredths as f64 / 100.0
}
