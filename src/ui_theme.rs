use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Shadow, Stroke, Vec2};

/// Dark studio theme applied to the whole egui context.
pub struct StudioTheme {
    // Colors
    pub background: Color32,
    pub surface: Color32,
    pub surface_hover: Color32,
    pub card: Color32,
    pub border: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub success: Color32,
    pub error: Color32,

    // Spacing
    pub spacing_small: f32,
    pub spacing_medium: f32,
    pub spacing_large: f32,
    pub padding_medium: f32,

    // Border radius
    pub radius_small: Rounding,
    pub radius_medium: Rounding,
    pub radius_large: Rounding,

    // Shadows
    pub shadow_medium: Shadow,

    // Typography
    pub font_small: FontId,
    pub font_medium: FontId,
    pub font_title: FontId,
}

impl Default for StudioTheme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(24, 24, 28),
            surface: Color32::from_rgb(42, 42, 48),
            surface_hover: Color32::from_rgb(54, 54, 62),
            card: Color32::from_rgb(34, 34, 40),
            border: Color32::from_rgb(64, 64, 72),
            text_primary: Color32::from_rgb(240, 240, 245),
            text_secondary: Color32::from_rgb(190, 190, 200),
            text_muted: Color32::from_rgb(130, 130, 140),
            accent: Color32::from_rgb(255, 105, 97), // instagram-ish coral
            success: Color32::from_rgb(52, 199, 89),
            error: Color32::from_rgb(255, 69, 58),

            spacing_small: 4.0,
            spacing_medium: 8.0,
            spacing_large: 14.0,
            padding_medium: 10.0,

            radius_small: Rounding::same(4.0),
            radius_medium: Rounding::same(8.0),
            radius_large: Rounding::same(14.0),

            shadow_medium: Shadow {
                offset: Vec2::new(0.0, 2.0),
                blur: 8.0,
                spread: 0.0,
                color: Color32::from_black_alpha(40),
            },

            font_small: FontId::new(12.0, FontFamily::Proportional),
            font_medium: FontId::new(14.0, FontFamily::Proportional),
            font_title: FontId::new(20.0, FontFamily::Proportional),
        }
    }
}

impl StudioTheme {
    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.background;
        style.visuals.window_shadow = self.shadow_medium;
        style.visuals.window_rounding = self.radius_large;

        style.visuals.button_frame = true;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);
        style.visuals.widgets.inactive.bg_fill = self.surface;
        style.visuals.widgets.inactive.rounding = self.radius_medium;
        style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);

        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);
        style.visuals.widgets.hovered.bg_fill = self.surface_hover;
        style.visuals.widgets.hovered.rounding = self.radius_medium;
        style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);

        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);
        style.visuals.widgets.active.bg_fill = self.surface_hover;
        style.visuals.widgets.active.rounding = self.radius_medium;
        style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, self.accent);

        style.visuals.text_cursor.stroke = Stroke::new(2.0, self.accent);
        style.visuals.selection.bg_fill = self.accent.linear_multiply(0.4);
        style.visuals.selection.stroke = Stroke::new(1.0, self.accent);

        style.text_styles = [
            (egui::TextStyle::Heading, self.font_title.clone()),
            (egui::TextStyle::Body, self.font_medium.clone()),
            (
                egui::TextStyle::Monospace,
                FontId::new(13.0, FontFamily::Monospace),
            ),
            (egui::TextStyle::Button, self.font_medium.clone()),
            (egui::TextStyle::Small, self.font_small.clone()),
        ]
        .into();

        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> egui::Frame {
        egui::Frame {
            inner_margin: egui::Margin::symmetric(self.padding_medium, self.padding_medium),
            rounding: self.radius_large,
            shadow: self.shadow_medium,
            fill: self.card,
            ..Default::default()
        }
    }
}
