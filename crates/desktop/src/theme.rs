use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

/// Black background with cyan accents; high contrast swaps in pure white text.
pub fn resolve_theme(high_contrast: bool) -> Theme {
    let palette = if high_contrast {
        high_contrast_palette()
    } else {
        mirror_palette()
    };
    Theme::custom("MoodMirror", palette)
}

fn mirror_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0x00, 0xff, 0xff),
        primary: color!(0x00, 0xc8, 0xc8),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn high_contrast_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0xff, 0xff, 0xff),
        primary: color!(0x00, 0xff, 0xff),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xd6, 0x0a),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

/// Dimmed text for secondary labels.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

/// Slightly lifted background for panels.
pub fn surface_color(theme: &Theme) -> Color {
    let bg = theme.palette().background;
    Color {
        r: (bg.r + 0.06).min(1.0),
        g: (bg.g + 0.06).min(1.0),
        b: (bg.b + 0.06).min(1.0),
        a: 1.0,
    }
}

/// Error text color.
pub fn danger_color(theme: &Theme) -> Color {
    theme.palette().danger
}
