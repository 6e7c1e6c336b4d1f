use crate::border;
use crate::color::{self, parse_color, to_hex_string};
use crate::ratio::AspectRatio;
use crate::throttle::PreviewThrottle;
use crate::ui_theme::StudioTheme;
use eframe::egui;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const COLOR_PLACEHOLDER: &str = "#FFFFFF or rgb(255, 255, 255)";
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Settings persisted between runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub border_color: String,
    pub aspect_ratio: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            border_color: to_hex_string(color::DEFAULT_COLOR),
            aspect_ratio: AspectRatio::default().label().to_string(),
        }
    }
}

struct StatusLine {
    message: String,
    is_error: bool,
}

pub struct BorderStudioApp {
    // Inputs
    source_image: Option<RgbImage>,
    source_path: Option<PathBuf>,
    color_text: String,
    ratio: AspectRatio,

    // Outputs
    preview_texture: Option<egui::TextureHandle>,
    last_export: Option<PathBuf>,

    // UI state
    status: Option<StatusLine>,
    previous_color_text: String, // Track settings to persist on change
    previous_ratio: AspectRatio,

    // Preview rate limiting
    throttle: PreviewThrottle,

    // Config file path
    config_path: PathBuf,

    // UI Theme
    theme: StudioTheme,
}

impl BorderStudioApp {
    pub fn new() -> Self {
        // Standard per-user config location
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("InstaBorderStudio");

        if !config_dir.exists() {
            if let Err(e) = fs::create_dir_all(&config_dir) {
                log::error!("Failed to create config directory: {}", e);
            }
        }

        let config_path = config_dir.join("config.json");
        let config = Self::load_config(&config_path).unwrap_or_default();

        let ratio = AspectRatio::from_label(&config.aspect_ratio).unwrap_or_default();

        Self {
            source_image: None,
            source_path: None,
            color_text: config.border_color.clone(),
            ratio,
            preview_texture: None,
            last_export: None,
            status: None,
            previous_color_text: config.border_color,
            previous_ratio: ratio,
            throttle: PreviewThrottle::default(),
            config_path,
            theme: StudioTheme::default(),
        }
    }

    fn load_config(path: &Path) -> Option<AppConfig> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::error!("Failed to parse config: {}", e);
                    None
                }
            },
            Err(e) => {
                log::error!("Failed to read config file: {}", e);
                None
            }
        }
    }

    fn save_config(&self) {
        let config = AppConfig {
            border_color: self.color_text.clone(),
            aspect_ratio: self.ratio.label().to_string(),
        };

        match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.config_path, json) {
                    log::error!("Failed to save config: {}", e);
                }
            }
            Err(e) => {
                log::error!("Failed to serialize config: {}", e);
            }
        }
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status = Some(StatusLine { message, is_error });
    }

    fn open_image_dialog(&mut self, ctx: &egui::Context) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", SUPPORTED_EXTENSIONS);
        if let Some(dir) = self.source_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.load_image(path, ctx);
        }
    }

    fn load_image(&mut self, path: PathBuf, ctx: &egui::Context) {
        match image::open(&path) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                log::info!(
                    "Loaded image {} ({}x{})",
                    path.display(),
                    rgb.width(),
                    rgb.height()
                );
                self.set_status(
                    format!(
                        "Loaded {} ({}x{})",
                        display_file_name(&path),
                        rgb.width(),
                        rgb.height()
                    ),
                    false,
                );
                self.source_image = Some(rgb);
                self.source_path = Some(path);
                self.last_export = None;
                self.request_preview(ctx);
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", path.display(), e);
                self.set_status(
                    format!("Could not open {}: {}", display_file_name(&path), e),
                    true,
                );
            }
        }
    }

    /// Refresh the preview texture, subject to the rate limiter.
    ///
    /// A request landing inside the throttle window is dropped, not queued:
    /// the previous preview stays on screen until a later change gets
    /// through.
    fn request_preview(&mut self, ctx: &egui::Context) {
        let Some(src) = &self.source_image else {
            self.preview_texture = None;
            return;
        };

        if !self.throttle.try_accept() {
            log::debug!("Preview refresh dropped by rate limiter");
            return;
        }

        let border_color = parse_color(&self.color_text);
        match border::compose_preview(src, border_color, self.ratio) {
            Ok(preview) => {
                let size = [preview.width() as usize, preview.height() as usize];
                let color_image = egui::ColorImage::from_rgb(size, preview.as_raw());
                self.preview_texture = Some(ctx.load_texture(
                    "bordered-preview",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => {
                log::error!("Preview composition failed: {}", e);
                self.preview_texture = None;
                self.set_status(format!("Preview failed: {}", e), true);
            }
        }
    }

    fn export_image(&mut self) {
        let Some(src) = &self.source_image else {
            return;
        };

        // Unique name per export; the user picks the destination
        let suggested = format!("bordered-{}.jpg", Uuid::new_v4());
        let mut dialog = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(&suggested);
        if let Some(dir) = self.source_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        let border_color = parse_color(&self.color_text);
        let result = border::compose(src, border_color, self.ratio)
            .and_then(|canvas| border::export_jpeg(&canvas, &path));

        match result {
            Ok(()) => {
                self.set_status(format!("Exported to {}", path.display()), false);
                self.last_export = Some(path);
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.set_status(format!("Export failed: {}", e), true);
            }
        }
    }

    fn clear(&mut self) {
        self.source_image = None;
        self.source_path = None;
        self.preview_texture = None;
        self.last_export = None;
        self.color_text = to_hex_string(color::DEFAULT_COLOR);
        self.status = None;
    }
}

impl eframe::App for BorderStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        // A dropped file counts as an image change
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().find(|p| is_supported_image(p)) {
            self.load_image(path, ctx);
        }

        // Persist settings when they change
        if self.color_text != self.previous_color_text || self.ratio != self.previous_ratio {
            self.previous_color_text = self.color_text.clone();
            self.previous_ratio = self.ratio;
            self.save_config();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(self.theme.spacing_medium);
            ui.columns(2, |columns| {
                self.show_inputs(&mut columns[0]);
                self.show_outputs(&mut columns[1]);
            });
        });
    }
}

impl BorderStudioApp {
    fn show_inputs(&mut self, ui: &mut egui::Ui) {
        let frame = self.theme.card_frame();
        frame.show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new("Source")
                        .size(18.0)
                        .strong()
                        .color(self.theme.text_primary),
                );
                ui.add_space(self.theme.spacing_medium);

                ui.horizontal(|ui| {
                    if ui.button("Open Image…").clicked() {
                        let ctx = ui.ctx().clone();
                        self.open_image_dialog(&ctx);
                    }
                    match (&self.source_path, &self.source_image) {
                        (Some(path), Some(img)) => {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{}  ({}x{})",
                                    display_file_name(path),
                                    img.width(),
                                    img.height()
                                ))
                                .color(self.theme.text_secondary),
                            );
                        }
                        _ => {
                            ui.label(
                                egui::RichText::new("No image (or drop a file here)")
                                    .color(self.theme.text_muted),
                            );
                        }
                    }
                });

                ui.add_space(self.theme.spacing_large);
                ui.label(
                    egui::RichText::new("Border color")
                        .size(14.0)
                        .color(self.theme.text_secondary),
                );
                ui.add_space(self.theme.spacing_small);

                ui.horizontal(|ui| {
                    let text_response = ui.add(
                        egui::TextEdit::singleline(&mut self.color_text)
                            .desired_width(200.0)
                            .hint_text(COLOR_PLACEHOLDER),
                    );

                    // Picker and text field stay in sync through the parser;
                    // unparsable text previews as white, same as the compositor.
                    let mut rgb = parse_color(&self.color_text).0;
                    let picker_response = ui.color_edit_button_srgb(&mut rgb);
                    if picker_response.changed() {
                        self.color_text = to_hex_string(Rgb(rgb));
                    }

                    if text_response.changed() || picker_response.changed() {
                        let ctx = ui.ctx().clone();
                        self.request_preview(&ctx);
                    }
                });

                ui.add_space(self.theme.spacing_large);
                ui.label(
                    egui::RichText::new("Aspect ratio")
                        .size(14.0)
                        .color(self.theme.text_secondary),
                );
                ui.add_space(self.theme.spacing_small);

                for ratio in AspectRatio::ALL {
                    if ui
                        .radio_value(&mut self.ratio, ratio, ratio.label())
                        .changed()
                    {
                        let ctx = ui.ctx().clone();
                        self.request_preview(&ctx);
                    }
                }

                ui.add_space(self.theme.spacing_large);
                ui.label(
                    egui::RichText::new(
                        "Preview updates live. Export writes a full-quality JPEG.",
                    )
                    .size(12.0)
                    .color(self.theme.text_muted),
                );
            });
        });
    }

    fn show_outputs(&mut self, ui: &mut egui::Ui) {
        let frame = self.theme.card_frame();
        frame.show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new("Preview")
                        .size(18.0)
                        .strong()
                        .color(self.theme.text_primary),
                );
                ui.add_space(self.theme.spacing_medium);

                let preview_height = (ui.available_height() - 110.0).max(160.0);
                ui.allocate_ui_with_layout(
                    egui::Vec2::new(ui.available_width(), preview_height),
                    egui::Layout::centered_and_justified(egui::Direction::TopDown),
                    |ui| match &self.preview_texture {
                        Some(texture) => {
                            ui.add(
                                egui::Image::new((texture.id(), texture.size_vec2()))
                                    .max_size(ui.available_size())
                                    .rounding(self.theme.radius_small),
                            );
                        }
                        None => {
                            ui.label(
                                egui::RichText::new("Nothing to preview yet")
                                    .size(14.0)
                                    .color(self.theme.text_muted),
                            );
                        }
                    },
                );

                ui.add_space(self.theme.spacing_medium);
                ui.horizontal(|ui| {
                    let can_export = self.source_image.is_some();
                    if ui
                        .add_enabled(can_export, egui::Button::new("Export JPEG…"))
                        .clicked()
                    {
                        self.export_image();
                    }
                    if ui.button("Clear").clicked() {
                        self.clear();
                    }
                });

                if let Some(path) = &self.last_export {
                    ui.add_space(self.theme.spacing_small);
                    ui.label(
                        egui::RichText::new(format!("Saved: {}", path.display()))
                            .size(12.0)
                            .monospace()
                            .color(self.theme.text_secondary),
                    );
                }

                if let Some(status) = &self.status {
                    ui.add_space(self.theme.spacing_small);
                    let color = if status.is_error {
                        self.theme.error
                    } else {
                        self.theme.success
                    };
                    ui.label(
                        egui::RichText::new(&status.message)
                            .size(12.0)
                            .color(color),
                    );
                }
            });
        });
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("PHOTO.PNG"))); // case insensitive
        assert!(!is_supported_image(Path::new("clip.mp4")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.border_color, "#FFFFFF");
        assert_eq!(config.aspect_ratio, "1:1 (Square)");
        assert!(AspectRatio::from_label(&config.aspect_ratio).is_some());
    }

    #[test]
    fn test_config_round_trip() {
        let config = AppConfig {
            border_color: "rgb(10, 20, 30)".to_string(),
            aspect_ratio: AspectRatio::Portrait.label().to_string(),
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.border_color, config.border_color);
        assert_eq!(parsed.aspect_ratio, config.aspect_ratio);
    }
}
