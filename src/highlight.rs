use inksac::prelude::*;

/// Colours for everything the shell prints, degraded to plain text when the
/// terminal has no colour support.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color_support: ColorSupport,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    /// Streamed model output.
    pub fn fragment(&self, text: &str) -> String {
        self.paint(text, Style::builder().foreground(Color::Blue).build())
    }

    pub fn prompt(&self, text: &str) -> String {
        self.paint(text, Style::builder().foreground(Color::Green).build())
    }

    pub fn command(&self, command: &str) -> String {
        self.paint(command, Style::builder().foreground(Color::Cyan).bold().build())
    }

    pub fn output(&self, output: &str) -> String {
        self.paint(
            output,
            Style::builder().foreground(Color::RGB(255, 105, 180)).build(),
        )
    }

    pub fn error(&self, error: &str) -> String {
        self.paint(error, Style::builder().foreground(Color::Red).bold().build())
    }

    pub fn hint(&self, hint: &str) -> String {
        self.paint(
            hint,
            Style::builder().foreground(Color::RGB(128, 128, 128)).build(),
        )
    }
}
