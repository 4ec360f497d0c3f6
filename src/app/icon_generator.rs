use std::sync::Arc;
use std::time::Instant;
use std::{path::PathBuf, thread::JoinHandle};

use eframe::egui::{
    self, Button, Checkbox, Color32, ColorImage, ComboBox, Context, DragValue,
    Image as EguiImage, ImageData, Label, RichText, Sense, Separator, TextEdit, TextureHandle,
    TextureOptions, load::SizedTexture,
};
use eframe::{App, CreationContext};

use crate::app::status::StatusMessage;
use crate::color::Color;
use crate::config::AppConfig;
use crate::image::rgba_image::LoadedRgbaImage;
use crate::image::{Image, SourceFormat};
use crate::layout::{DimensionError, FitMode};
use crate::loader::{start_load, LoadInput, PendingLoad};
use crate::resize::ResizeFilter;
use crate::session::Session;

pub struct IconGenerator {
    config: AppConfig,
    session: Session,

    load_file_dialogue: Option<JoinHandle<Option<PathBuf>>>,
    pending_load: Option<PendingLoad>,
    src_text_box_contents: String,

    save_file_dialogue: Option<JoinHandle<Option<PathBuf>>>,
    dest_text_box_contents: String,

    target_width: u32,
    target_height: u32,
    aspect_locked: bool,
    fit_mode: FitMode,
    resize_filter: ResizeFilter,
    background: [u8; 3],
    fill: [u8; 3],

    source_preview: Option<TextureHandle>,
    output_preview: Option<TextureHandle>,
    output_revision: u64,

    status: Option<StatusMessage>,
}

impl IconGenerator {
    pub fn new(_cc: &CreationContext<'_>, config: AppConfig) -> Self {
        let session = Session::new(&config);
        let target = session.target();
        Self {
            load_file_dialogue: None,
            pending_load: None,
            src_text_box_contents: String::new(),
            save_file_dialogue: None,
            dest_text_box_contents: String::new(),
            target_width: target.dimensions.width(),
            target_height: target.dimensions.height(),
            aspect_locked: target.aspect_locked,
            fit_mode: session.fit_mode(),
            resize_filter: session.resize_filter(),
            background: session.background().into(),
            fill: config.fill.into(),
            source_preview: None,
            output_preview: None,
            output_revision: 0,
            status: None,
            session,
            config,
        }
    }

    fn upload_image_to_texture(
        image: &LoadedRgbaImage,
        ctx: &Context,
        texture_name: &str,
    ) -> TextureHandle {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = Arc::new(ColorImage::from_rgba_unmultiplied(size, image.as_bytes()));
        let image_data = ImageData::Color(color_image);
        ctx.load_texture(texture_name, image_data, TextureOptions::default())
    }

    fn sync_target_fields(&mut self) {
        let target = self.session.target();
        self.target_width = target.dimensions.width();
        self.target_height = target.dimensions.height();
        self.aspect_locked = target.aspect_locked;
    }

    fn begin_load(&mut self, input: LoadInput, declared_mime: Option<&str>) {
        match start_load(&mut self.session, input, declared_mime) {
            Ok(pending) => self.pending_load = Some(pending),
            Err(err) => self.status = Some(StatusMessage::error(err.to_string())),
        }
    }

    fn poll_load_dialogue(&mut self) {
        let Some(src_fd) = self.load_file_dialogue.take() else {
            return;
        };
        if !src_fd.is_finished() {
            self.load_file_dialogue = Some(src_fd);
            return;
        }
        match src_fd.join() {
            Ok(Some(path)) => {
                self.src_text_box_contents = path.to_string_lossy().to_string();
                self.begin_load(LoadInput::Path(path), None);
            }
            Ok(None) => {}
            Err(panic_message) => log::error!("file dialog thread panicked: {panic_message:?}"),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        let declared_mime = (!file.mime.is_empty()).then_some(file.mime.clone());
        let input = match (file.path, file.bytes) {
            (Some(path), _) => {
                self.src_text_box_contents = path.to_string_lossy().to_string();
                LoadInput::Path(path)
            }
            (None, Some(bytes)) => {
                self.src_text_box_contents = file.name.clone();
                LoadInput::Bytes {
                    name: file.name,
                    bytes,
                }
            }
            (None, None) => {
                log::warn!("dropped file {} has neither path nor bytes", file.name);
                return;
            }
        };
        self.begin_load(input, declared_mime.as_deref());
    }

    fn poll_pending_load(&mut self, ctx: &Context) {
        let Some(pending) = self.pending_load.take() else {
            return;
        };
        let (ticket, result) = match pending.poll() {
            Ok(done) => done,
            Err(pending) => {
                self.pending_load = Some(pending);
                ctx.request_repaint();
                return;
            }
        };
        match self.session.finish_load(ticket, result) {
            Ok(true) => {
                if let Some(source) = self.session.source() {
                    self.source_preview = Some(Self::upload_image_to_texture(
                        source.pixels(),
                        ctx,
                        "Source Preview",
                    ));
                }
                self.dest_text_box_contents.clear();
                self.sync_target_fields();
            }
            Ok(false) => {}
            Err(err) => self.status = Some(StatusMessage::error(err.to_string())),
        }
    }

    fn open_save_dialogue(&mut self) {
        if self.save_file_dialogue.is_some() {
            return;
        }
        let file_name = match self.session.file_name() {
            Ok(Some(name)) => name,
            Ok(None) => return,
            Err(err) => {
                self.status = Some(StatusMessage::error(err.to_string()));
                return;
            }
        };
        self.save_file_dialogue = Some(std::thread::spawn(move || {
            rfd::FileDialog::new()
                .set_file_name(file_name)
                .add_filter("PNG image", &["png"])
                .save_file()
        }));
    }

    fn poll_save_dialogue(&mut self) {
        let Some(dest_fd) = self.save_file_dialogue.take() else {
            return;
        };
        if !dest_fd.is_finished() {
            self.save_file_dialogue = Some(dest_fd);
            return;
        }
        match dest_fd.join() {
            Ok(Some(path)) => match self.session.save_png(&path) {
                Ok(saved) => {
                    self.dest_text_box_contents = saved.to_string_lossy().to_string();
                    self.status = Some(StatusMessage::success("Image saved successfully!"));
                }
                Err(err) => {
                    log::error!("save failed: {err}");
                    self.status = Some(StatusMessage::error(err.to_string()));
                }
            },
            Ok(None) => {}
            Err(panic_message) => log::error!("save dialog thread panicked: {panic_message:?}"),
        }
    }

    fn refresh_output_preview(&mut self, ctx: &Context) {
        if let Err(err) = self.session.render() {
            log::error!("render failed: {err}");
            self.status = Some(StatusMessage::error(err.to_string()));
            return;
        }
        let revision = self.session.revision();
        match self.session.current_result() {
            Some(result) => {
                if self.output_revision != revision || self.output_preview.is_none() {
                    self.output_preview = Some(Self::upload_image_to_texture(
                        result.image(),
                        ctx,
                        "Output Preview",
                    ));
                }
            }
            None => self.output_preview = None,
        }
        self.output_revision = revision;
    }

    fn file_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.src_text_box_contents)
                    .hint_text("Source file... (or drop an image)")
                    .interactive(false),
            );
            if ui.add(Button::new("Browse")).clicked() && self.load_file_dialogue.is_none() {
                self.load_file_dialogue = Some(std::thread::spawn(move || {
                    rfd::FileDialog::new()
                        .add_filter("Image Formats", &SourceFormat::EXTENSIONS)
                        .pick_file()
                }));
            }
            if self.pending_load.is_some() {
                ui.spinner();
            }
            ui.add(Separator::default().vertical());
            ui.add(
                TextEdit::singleline(&mut self.dest_text_box_contents)
                    .hint_text("Destination file...")
                    .interactive(false),
            );
            if ui
                .add_enabled(self.session.has_content(), Button::new("Save as"))
                .clicked()
            {
                self.open_save_dialogue();
            }
        });
    }

    fn size_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let range = 1..=self.session.max_dimension();
            if ui
                .add(
                    DragValue::new(&mut self.target_width)
                        .range(range.clone())
                        .speed(1.0)
                        .update_while_editing(false)
                        .prefix("W: "),
                )
                .changed()
            {
                let result = self.session.set_target_width(self.target_width);
                self.finish_dimension_edit(result);
            }
            if ui
                .add(
                    DragValue::new(&mut self.target_height)
                        .range(range)
                        .speed(1.0)
                        .update_while_editing(false)
                        .prefix("H: "),
                )
                .changed()
            {
                let result = self.session.set_target_height(self.target_height);
                self.finish_dimension_edit(result);
            }
            if ui
                .add(Checkbox::new(&mut self.aspect_locked, "Lock Aspect Ratio"))
                .changed()
            {
                self.session.set_aspect_locked(self.aspect_locked);
                self.sync_target_fields();
            }
        });
    }

    /// Rejected values snap the field back and show why.
    fn finish_dimension_edit(&mut self, result: Result<(), DimensionError>) {
        if let Err(err) = result {
            self.status = Some(StatusMessage::rejected_dimension(&err));
        }
        self.sync_target_fields();
    }

    fn mode_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ComboBox::from_label("Fit")
                .selected_text(self.fit_mode.label())
                .show_ui(ui, |ui| {
                    for mode in FitMode::ALL {
                        ui.selectable_value(&mut self.fit_mode, mode, mode.label());
                    }
                });
            self.session.set_fit_mode(self.fit_mode);

            ComboBox::from_label("Scaling")
                .selected_text(self.resize_filter.name())
                .show_ui(ui, |ui| {
                    for filter in ResizeFilter::ALL {
                        ui.selectable_value(&mut self.resize_filter, filter, filter.name());
                    }
                });
            self.session.set_resize_filter(self.resize_filter);

            ui.label("Background:");
            if ui.color_edit_button_srgb(&mut self.background).changed() {
                self.session.set_background(Color::from(self.background));
            }
        });
    }

    fn fill_row(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        ui.horizontal(|ui| {
            ui.label("Fill:");
            ui.color_edit_button_srgb(&mut self.fill);
            if ui.add(Button::new("Generate flat square")).clicked() {
                self.session.generate_flat_fill(Color::from(self.fill));
                self.pending_load = None;
                self.source_preview = None;
                self.src_text_box_contents.clear();
                self.dest_text_box_contents.clear();
                ctx.request_repaint();
            }
        });
    }

    fn status_row(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        let Some(status) = &self.status else {
            return;
        };
        let Some(remaining) = status.remaining(self.config.message_lifetime, Instant::now())
        else {
            self.status = None;
            return;
        };
        let text = format!("{} {}", status.icon(), status.text);
        if ui
            .add(
                Label::new(RichText::new(text.clone()).color(status.color()))
                    .selectable(false)
                    .sense(Sense::click()),
            )
            .on_hover_text("Right click to copy")
            .secondary_clicked()
        {
            ctx.copy_text(text);
        }
        ctx.request_repaint_after(remaining);
    }

    fn dimension_label(ui: &mut egui::Ui, image: Option<&LoadedRgbaImage>) {
        if let Some(image) = image {
            ui.add(Label::new(format!("{} × {} px", image.width(), image.height())));
        }
    }
}

impl App for IconGenerator {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load_dialogue();
        self.handle_dropped_files(ctx);
        self.poll_pending_load(ctx);
        self.poll_save_dialogue();
        if self.load_file_dialogue.is_some() || self.save_file_dialogue.is_some() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("Controls").show(ctx, |ui| {
            ui.vertical(|ui| {
                self.file_row(ui);
                self.size_row(ui);
                self.mode_row(ui);
                self.fill_row(ui, ctx);
                self.status_row(ui, ctx);
            });
        });

        self.refresh_output_preview(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if ctx.input(|input| !input.raw.hovered_files.is_empty()) {
                ui.painter().rect_filled(
                    ui.max_rect(),
                    0.0,
                    Color32::from_rgba_unmultiplied(0, 160, 0, 40),
                );
            }
            let separator_size = 5.0;
            let label_height = 20.0;
            let width = ui.available_width() - separator_size;
            let height = ui.available_height() - label_height;
            let half_width = width / 2.0;

            ui.horizontal(|ui| {
                Self::dimension_label(ui, self.session.source().map(|source| source.pixels()));
                ui.add_space(half_width);
                Self::dimension_label(
                    ui,
                    self.session.current_result().map(|result| result.image()),
                );
            });

            ui.horizontal(|ui| {
                let (left_rect, _left_response) =
                    ui.allocate_exact_size([half_width, height].into(), Sense::hover());
                let (separator_rect, _) =
                    ui.allocate_exact_size([separator_size, height].into(), Sense::hover());
                let (right_rect, _right_response) =
                    ui.allocate_exact_size([half_width, height].into(), Sense::hover());

                if let Some(texture_handle) = &self.source_preview {
                    ui.put(
                        left_rect,
                        EguiImage::new(SizedTexture::from_handle(texture_handle))
                            .maintain_aspect_ratio(true)
                            .max_width(half_width)
                            .max_height(height),
                    );
                } else if !self.session.has_content() {
                    ui.put(left_rect, Label::new("Drop an image here or click Browse"));
                }
                ui.put(
                    separator_rect,
                    Separator::default().vertical().spacing(separator_size),
                );

                if let Some(texture_handle) = &self.output_preview {
                    ui.put(
                        right_rect,
                        EguiImage::new(SizedTexture::from_handle(texture_handle))
                            .maintain_aspect_ratio(true)
                            .max_width(half_width)
                            .max_height(height),
                    );
                }
            });
        });
    }
}
