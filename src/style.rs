//! Styling helpers for console output.
//!
//! The [`ConsoleStyle`] trait wraps the `colored` crate so string literals
//! can be styled in place. Implementations for `&str` and `String` are
//! provided.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to console text.
pub trait ConsoleStyle {
    fn room_style(&self) -> ColoredString;
    fn zone_style(&self) -> ColoredString;
    fn description_style(&self) -> ColoredString;
    fn note_style(&self) -> ColoredString;
    fn exit_style(&self) -> ColoredString;
    fn heading_style(&self) -> ColoredString;
    fn dim_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl ConsoleStyle for &str {
    fn room_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10)
    }
    fn zone_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn description_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn note_style(&self) -> ColoredString {
        self.truecolor(75, 180, 255)
    }
    fn exit_style(&self) -> ColoredString {
        self.italic().truecolor(110, 220, 110)
    }
    fn heading_style(&self) -> ColoredString {
        self.underline()
    }
    fn dim_style(&self) -> ColoredString {
        self.truecolor(120, 125, 120)
    }
    fn error_style(&self) -> ColoredString {
        self.bold().truecolor(230, 30, 30)
    }
}

impl ConsoleStyle for String {
    fn room_style(&self) -> ColoredString {
        self.as_str().room_style()
    }
    fn zone_style(&self) -> ColoredString {
        self.as_str().zone_style()
    }
    fn description_style(&self) -> ColoredString {
        self.as_str().description_style()
    }
    fn note_style(&self) -> ColoredString {
        self.as_str().note_style()
    }
    fn exit_style(&self) -> ColoredString {
        self.as_str().exit_style()
    }
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn dim_style(&self) -> ColoredString {
        self.as_str().dim_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
