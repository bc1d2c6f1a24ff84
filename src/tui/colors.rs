//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::TaskLabel;

/// Accent used for the selected column, the status bar and modal borders.
pub const BOARD_BLUE: Color = Color::Rgb(0, 82, 155);
/// Used for TODO tasks
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for in-progress tasks
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for completed tasks
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Used for error status messages
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Card accent for a task label.
pub fn label_color(label: TaskLabel) -> Color {
    match label {
        TaskLabel::Todo => GOLD,
        TaskLabel::InProgress => DARK_GREEN,
        TaskLabel::Done => DARK_PURPLE,
    }
}

/// Readable foreground for text drawn on `background`.
pub fn text_on(background: Color) -> Color {
    match background {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
