use parcelview::{
    compositor::HitTarget,
    core::geo::Point,
    engine::drill::BoundaryLevel,
    prelude::*,
    upload::{HttpProcessor, ImageUpload},
};

use anyhow::Context as _;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Desktop viewer for land-parcel extraction results
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let data_dir = std::env::var_os("PARCELVIEW_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let boundaries = Arc::new(
        ReferenceBoundaries::from_dir(&data_dir)
            .with_context(|| format!("loading boundary files from {}", data_dir.display()))?,
    );

    let backend_url =
        std::env::var("PARCELVIEW_BACKEND").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
    let runtime = tokio::runtime::Handle::current();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Parcelview - Cadastre Cameroun"),
        ..Default::default()
    };

    eframe::run_native(
        "parcelview-app",
        options,
        Box::new(move |_cc| {
            Box::new(ParcelviewApp::new(boundaries, &backend_url, runtime))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))?;

    Ok(())
}

struct ParcelviewApp {
    map: Map,
    store: PolygonStore,
    engine: DrillDownEngine,
    compositor: OverlayCompositor,
    controls: MapControls,
    adapter: UploadAdapter,
    backend_url: String,
    textures: HashMap<String, egui::TextureHandle>,
    last_error: Option<String>,
    hovered_label: Option<String>,
}

impl ParcelviewApp {
    fn new(
        boundaries: Arc<ReferenceBoundaries>,
        backend_url: &str,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let processor = Arc::new(HttpProcessor::new(backend_url));
        Self {
            map: Map::with_default_view(Point::new(1200.0, 800.0)),
            store: PolygonStore::new(),
            engine: DrillDownEngine::new(boundaries),
            compositor: OverlayCompositor::new(),
            controls: MapControls::new(),
            adapter: UploadAdapter::new(processor, runtime),
            backend_url: backend_url.to_string(),
            textures: HashMap::default(),
            last_error: None,
            hovered_label: None,
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let name = if file.name.is_empty() {
                file.path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string())
            } else {
                file.name.clone()
            };

            let bytes = match (&file.bytes, &file.path) {
                (Some(bytes), _) => bytes.to_vec(),
                (None, Some(path)) => match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        self.last_error = Some(format!("Erreur: {e}"));
                        continue;
                    }
                },
                (None, None) => continue,
            };

            let upload = ImageUpload::new(name.clone(), guess_mime(&name), bytes);
            if let Err(err) = self.adapter.submit(upload) {
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn poll_uploads(&mut self) {
        for event in self.adapter.poll_events() {
            match event {
                UploadEvent::Processed(record) => {
                    self.store.append(record);
                }
                UploadEvent::Failed(err) => self.last_error = Some(err.to_string()),
            }
        }
    }

    fn handle_map_interaction(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.interact(rect, ui.id().with("map"), egui::Sense::click_and_drag());

        if response.dragged() {
            let delta = response.drag_delta();
            let size = self.map.viewport().size;
            let new_center = self.map.viewport().pixel_to_lat_lng(&Point::new(
                size.x / 2.0 - delta.x as f64,
                size.y / 2.0 - delta.y as f64,
            ));
            self.map.viewport_mut().set_center(new_center);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll > 0.0 {
                self.map.zoom_in();
            } else if scroll < 0.0 {
                self.map.zoom_out();
            }
        }

        let to_lat_lng = |pos: egui::Pos2, map: &Map| {
            map.viewport().pixel_to_lat_lng(&Point::new(
                (pos.x - rect.min.x) as f64,
                (pos.y - rect.min.y) as f64,
            ))
        };

        self.hovered_label = None;
        let hover = response.hover_pos().map(|pos| to_lat_lng(pos, &self.map));
        self.compositor.update_hover(&mut self.map, hover.as_ref());
        if let Some(point) = &hover {
            if let Some(HitTarget::Parcel { id }) = self.compositor.hit_test(&self.map, point) {
                self.hovered_label = self
                    .store
                    .get(id)
                    .and_then(|r| {
                        r.administrative_names.arrondissement.clone().or_else(|| {
                            r.owner_name.clone()
                        })
                    });
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let point = to_lat_lng(pos, &self.map);
                match self.compositor.hit_test(&self.map, &point) {
                    Some(HitTarget::Boundary { level, name }) => match level {
                        BoundaryLevel::Regions => self.engine.click_region(&name),
                        BoundaryLevel::Departments => self.engine.click_department(&name),
                        BoundaryLevel::Arrondissements => {}
                    },
                    Some(HitTarget::Parcel { id }) => {
                        self.store.select(id);
                        self.compositor.focus_selection(&mut self.map, &self.store);
                    }
                    None => {}
                }
            }
        }
    }

    fn paint_map(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(226, 232, 240));

        let to_pos = |coord: &LatLng, map: &Map| {
            let pixel = map.viewport().lat_lng_to_pixel(coord);
            egui::pos2(rect.min.x + pixel.x as f32, rect.min.y + pixel.y as f32)
        };

        // Decode any image overlays that have not been textured yet
        let mut wanted: Vec<(String, Arc<Vec<u8>>)> = Vec::new();
        for layer in self.map.layer_manager().layers() {
            if let Some(overlay) = layer.as_any().downcast_ref::<ImageOverlay>() {
                if !self.textures.contains_key(overlay.id()) {
                    wanted.push((overlay.id().to_string(), Arc::clone(overlay.data())));
                }
            }
        }
        for (id, bytes) in wanted {
            match decode_texture(ui.ctx(), &id, &bytes) {
                Ok(texture) => {
                    self.textures.insert(id, texture);
                }
                Err(e) => log::warn!("could not decode {id}: {e}"),
            }
        }

        for layer in self.map.layer_manager().layers() {
            if !layer.is_visible() {
                continue;
            }
            if let Some(vector) = layer.as_any().downcast_ref::<VectorLayer>() {
                for shape in vector.shapes() {
                    let points: Vec<egui::Pos2> =
                        shape.ring.iter().map(|c| to_pos(c, &self.map)).collect();
                    if points.len() < 3 {
                        continue;
                    }
                    let style = shape.effective_style();
                    let fill = egui::Color32::from_rgba_unmultiplied(
                        style.fill_color.r,
                        style.fill_color.g,
                        style.fill_color.b,
                        (style.fill_opacity * 255.0) as u8,
                    );
                    let stroke = egui::Stroke::new(
                        style.stroke_width,
                        egui::Color32::from_rgb(
                            style.stroke_color.r,
                            style.stroke_color.g,
                            style.stroke_color.b,
                        ),
                    );
                    painter.add(egui::Shape::convex_polygon(
                        points.clone(),
                        fill,
                        egui::Stroke::NONE,
                    ));
                    painter.add(egui::Shape::closed_line(points, stroke));
                }
            } else if let Some(overlay) = layer.as_any().downcast_ref::<ImageOverlay>() {
                let Some(texture) = self.textures.get(overlay.id()) else {
                    continue;
                };
                let footprint = overlay.footprint();
                let nw = to_pos(
                    &LatLng::new(footprint.north_east.lat, footprint.south_west.lng),
                    &self.map,
                );
                let se = to_pos(
                    &LatLng::new(footprint.south_west.lat, footprint.north_east.lng),
                    &self.map,
                );
                let tint =
                    egui::Color32::from_white_alpha((overlay.opacity() * 255.0) as u8);
                painter.image(
                    texture.id(),
                    egui::Rect::from_two_pos(nw, se),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    tint,
                );
            }
        }

        if let Some(label) = &self.hovered_label {
            if let Some(pos) = ui.ctx().pointer_hover_pos() {
                painter.text(
                    pos + egui::vec2(12.0, -12.0),
                    egui::Align2::LEFT_BOTTOM,
                    label,
                    egui::FontId::proportional(13.0),
                    egui::Color32::BLACK,
                );
            }
        }
    }

    fn nav_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let buttons = [
                (NavCommand::ZoomIn, "+"),
                (NavCommand::ZoomOut, "−"),
                (NavCommand::Back, "Retour"),
                (NavCommand::Reset, "Réinitialiser"),
                (NavCommand::FocusRegion, "Régions"),
                (NavCommand::FocusDepartment, "Départements"),
                (NavCommand::FocusArrondissement, "Arrondissement"),
            ];
            for (command, label) in buttons {
                let enabled = self.controls.is_enabled(command, &self.engine, &self.store);
                if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                    self.controls
                        .dispatch(command, &mut self.map, &mut self.engine, &self.store);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.adapter.is_busy() {
                    ui.spinner();
                    ui.label("Traitement en cours...");
                }
                let viewport = self.map.viewport();
                ui.label(format!(
                    "Centre: {:.4}, {:.4} | Zoom: {:.0}",
                    viewport.center.lat, viewport.center.lng, viewport.zoom
                ));
            });
        });
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Parcelles");
        ui.label(format!(
            "{} parcelle(s), {} département(s), {} image(s)",
            self.store.len(),
            self.store.distinct_departments(),
            self.adapter.previews().len()
        ));
        ui.separator();

        let mut clicked: Option<RecordId> = None;
        let selected = self.store.current_selection().map(|r| r.id);
        egui::ScrollArea::vertical().show(ui, |ui| {
            for record in self.store.iter() {
                let label = format!(
                    "{} — {:.0} m²",
                    record.display_name(),
                    record.area_value
                );
                if ui
                    .selectable_label(Some(record.id) == selected, label)
                    .clicked()
                {
                    clicked = Some(record.id);
                }
            }

            if !self.adapter.previews().is_empty() {
                ui.separator();
                ui.label("Images envoyées:");
                for preview in self.adapter.previews() {
                    ui.small(&preview.file_name);
                }
            }
        });

        if let Some(id) = clicked {
            self.store.select(id);
            self.compositor.focus_selection(&mut self.map, &self.store);
        }

        ui.separator();
        ui.small(format!("Backend: {}", self.backend_url));
        ui.small("Glissez-déposez une image pour l'analyser");
    }

    fn error_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.last_error.clone() else {
            return;
        };
        egui::Window::new("Erreur")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    self.last_error = None;
                }
            });
    }
}

impl eframe::App for ParcelviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.poll_uploads();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| self.nav_bar(ui));
        egui::SidePanel::right("records")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            self.map
                .viewport_mut()
                .set_size(Point::new(rect.width() as f64, rect.height() as f64));

            let previews = self.adapter.previews().to_vec();
            if let Err(e) =
                self.compositor
                    .sync(&mut self.map, &self.store, &mut self.engine, &previews)
            {
                log::error!("overlay sync failed: {e}");
            }

            self.handle_map_interaction(ui, rect);
            self.paint_map(ui, rect);
        });

        self.error_modal(ctx);

        if self.adapter.is_busy() {
            ctx.request_repaint();
        }
    }
}

fn guess_mime(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    match lower.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn decode_texture(
    ctx: &egui::Context,
    id: &str,
    bytes: &[u8],
) -> anyhow::Result<egui::TextureHandle> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());
    Ok(ctx.load_texture(id, color_image, egui::TextureOptions::LINEAR))
}
