use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::platform;
use crate::settings::Appearance;

/// Resolve the iced Theme from appearance + high_contrast settings.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => platform::is_dark_mode(),
    };

    let palette = match (is_dark, high_contrast) {
        (true, false) => dark_palette(),
        (false, false) => light_palette(),
        (true, true) => high_contrast_dark_palette(),
        (false, true) => high_contrast_light_palette(),
    };

    Theme::custom("FaceSense", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x3b, 0x82, 0xf6),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xef, 0x44, 0x44),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf9, 0xfa, 0xfb),
        text: color!(0x1f, 0x29, 0x37),
        primary: color!(0x25, 0x63, 0xeb),
        success: color!(0x16, 0xa3, 0x4a),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xdc, 0x26, 0x26),
    }
}

fn high_contrast_dark_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0xff, 0xff, 0xff),
        primary: color!(0x6c, 0xb4, 0xff),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xd6, 0x0a),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn high_contrast_light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x00, 0x00, 0x00),
        primary: color!(0x00, 0x50, 0xd0),
        success: color!(0x24, 0x8a, 0x3d),
        warning: color!(0xb2, 0x5c, 0x00),
        danger: color!(0xd7, 0x00, 0x15),
    }
}

fn is_light(theme: &Theme) -> bool {
    let p = theme.palette();
    p.background.r * 0.299 + p.background.g * 0.587 + p.background.b * 0.114 > 0.5
}

/// Secondary text, e.g. card field labels.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.75,
        ..theme.palette().text
    }
}

/// Hints and captions.
pub fn tertiary_color(theme: &Theme) -> Color {
    Color {
        a: 0.5,
        ..theme.palette().text
    }
}

/// Panel background, slightly off the window background.
pub fn surface_color(theme: &Theme) -> Color {
    let p = theme.palette();
    if is_light(theme) {
        color!(0xff, 0xff, 0xff)
    } else {
        Color {
            r: (p.background.r + 0.06).min(1.0),
            g: (p.background.g + 0.06).min(1.0),
            b: (p.background.b + 0.06).min(1.0),
            a: 1.0,
        }
    }
}

/// Placeholder wells (camera off, empty upload area).
pub fn well_color(theme: &Theme) -> Color {
    let p = theme.palette();
    if is_light(theme) {
        color!(0xf3, 0xf4, 0xf6)
    } else {
        Color {
            r: (p.background.r + 0.12).min(1.0),
            g: (p.background.g + 0.12).min(1.0),
            b: (p.background.b + 0.12).min(1.0),
            a: 1.0,
        }
    }
}
