use eframe::egui::Color32;
use palette::{Darken, Hsl, IntoColor, Srgb};

use crate::data::model::Channel;

// ---------------------------------------------------------------------------
// Channel colours
// ---------------------------------------------------------------------------

/// Fixed colour assignment for the three channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelPalette {
    pub a: Color32,
    pub b: Color32,
    pub c: Color32,
}

impl ChannelPalette {
    /// Red / green / blue, used by the bar chart.
    pub const RGB: Self = Self {
        a: Color32::RED,
        b: Color32::GREEN,
        c: Color32::BLUE,
    };

    /// Red / blue / green, used by the line chart.
    pub const RBG: Self = Self {
        a: Color32::RED,
        b: Color32::BLUE,
        c: Color32::GREEN,
    };

    pub fn color_for(&self, channel: Channel) -> Color32 {
        match channel {
            Channel::A => self.a,
            Channel::B => self.b,
            Channel::C => self.c,
        }
    }
}

/// Darker shade of `color`, used for bar outlines.
pub fn outline(color: Color32) -> Color32 {
    let rgb = Srgb::new(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    let rgb: Srgb = hsl.darken(0.35).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}
