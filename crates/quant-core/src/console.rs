//! Terminal console utilities for rich output

use std::borrow::Cow;
use std::env;
use std::io::{self, IsTerminal};

const DEFAULT_WIDTH: usize = 100;

/// Console output handler with color support and terminal width detection
#[derive(Debug, Clone)]
pub struct Console {
    color_enabled: bool,
    max_width: usize,
}

impl Console {
    /// Create a new console with automatic color and terminal detection
    pub fn new() -> Self {
        Self {
            color_enabled: io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none(),
            max_width: Self::detect_terminal_width(),
        }
    }

    /// Terminal width, or 100 when stdout is not a terminal
    fn detect_terminal_width() -> usize {
        term_size::dimensions()
            .map(|(width, _)| width)
            .filter(|&width| width > 0)
            .unwrap_or(DEFAULT_WIDTH)
    }

    pub fn is_color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Colorize text with the specified color
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        format!("\x1b[{}m{text}\x1b[0m", color.ansi_code())
    }

    /// Widest line the code frames are allowed to print
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Create a console with colors disabled
    pub fn no_colors() -> Self {
        Self {
            color_enabled: false,
            max_width: Self::detect_terminal_width(),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Cut `text` to `width` characters, marking the cut with `…`
    pub fn clip<'t>(&self, text: &'t str, width: usize) -> Cow<'t, str> {
        if width == 0 || text.chars().count() <= width {
            return Cow::Borrowed(text);
        }
        let mut clipped: String = text.chars().take(width - 1).collect();
        clipped.push('…');
        Cow::Owned(clipped)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// ANSI color codes for terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Blue,
    Green,
    Cyan,
    Dim,
    Bold,
}

impl Color {
    fn ansi_code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Green => 32,
            Color::Cyan => 36,
            Color::Dim => 2,
            Color::Bold => 1,
        }
    }
}
