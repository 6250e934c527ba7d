use anyhow::Context;
use clap::Parser;
use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, image, row, scrollable, slider, text, Column, Container,
    },
    Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Task, Theme,
};
use log::warn;
use rfidcore::config::SiteConfig;
use rfidcore::floorplan::Floorplan;
use rfidcore::overlay::{BoundaryRing, ContourLine, OverlaySet, ReaderMarker};
use rfidcore::prelude::GridSize;
use rfidcore::reader::{RADIUS_MAX_M, RADIUS_MIN_M, RADIUS_STEP_M};
use rfidcore::render::{
    compose_heatmap, legend_colors, load_label_font, paint_overlays, LabelFont, OverlayPainter,
    EXPORT_FILE_NAME, LEGEND_CAPTION, LEGEND_STOPS,
};
use rfidcore::session::{CoverageFrame, CoverageSession};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Interactive RFID reader radiation pattern designer")]
struct Args {
    /// Load the site description from YAML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let site = match &args.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("loading site config {}", path.display()))?,
        None => SiteConfig::default(),
    };
    let floorplan = Floorplan::load(&site.floorplan).context("loading floorplan")?;
    let session = CoverageSession::from_config(&site, floorplan.grid())
        .context("building coverage session")?;
    let font = site
        .label_font
        .as_deref()
        .and_then(|path| match load_label_font(path) {
            Ok(font) => Some(Arc::new(font)),
            Err(err) => {
                warn!("using bundled label font: {}", err);
                None
            }
        });

    iced::application(
        move || Visualizer::boot(session.clone(), floorplan.clone(), font.clone()),
        Visualizer::update,
        Visualizer::view,
    )
    .title(application_title)
    .theme(application_theme)
    .run()?;
    Ok(())
}

fn application_title(_: &Visualizer) -> String {
    "RFID Reader Radiation Pattern Designer".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

struct Visualizer {
    session: CoverageSession,
    floorplan: Floorplan,
    font: Option<Arc<LabelFont>>,
    frame: Arc<CoverageFrame>,
    /// Drawn over the heatmap; follows slider drags before the field catches up.
    overlays: OverlaySet,
    heatmap: image::Handle,
    expanded: Vec<bool>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    ToggleReader(usize),
    SliderMoved(String, Axis, u32),
    SliderReleased,
    Export,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Radius,
}

impl Visualizer {
    fn boot(
        mut session: CoverageSession,
        floorplan: Floorplan,
        font: Option<Arc<LabelFont>>,
    ) -> (Self, Task<Message>) {
        let frame = session.frame();
        let heatmap = heatmap_handle(&floorplan, &frame, session.heatmap_alpha());
        let expanded = vec![false; session.readers().len()];
        let overlays = frame.overlays.clone();
        (
            Visualizer {
                session,
                floorplan,
                font,
                frame,
                overlays,
                heatmap,
                expanded,
                status: "Coverage map ready.".into(),
                history: Vec::new(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleReader(idx) => {
                if let Some(open) = state.expanded.get_mut(idx) {
                    *open = !*open;
                }
            }
            Message::SliderMoved(id, axis, value) => {
                let Some(reader) = state.session.readers().get(&id) else {
                    return Task::none();
                };
                let (x, y) = (reader.position.x, reader.position.y);
                let value = f64::from(value);
                let changed = match axis {
                    Axis::X => state.session.set_position(&id, value, y),
                    Axis::Y => state.session.set_position(&id, x, value),
                    Axis::Radius => state.session.set_radius(&id, value),
                };
                if changed {
                    state.overlays = state.session.live_overlays();
                }
            }
            Message::SliderReleased => state.refresh(),
            Message::Export => {
                let path = FsPath::new(EXPORT_FILE_NAME);
                let result = state.session.export(
                    state.floorplan.image(),
                    path,
                    state.font.as_deref(),
                );
                state.status = match result {
                    Ok(()) => format!("Saved as {}", EXPORT_FILE_NAME),
                    Err(err) => format!("Save failed: {err}"),
                };
                state.push_history(state.status.clone());
            }
        }
        Task::none()
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let grid = state.session.grid();

        let reader_controls = state.session.readers().iter().enumerate().fold(
            Column::new().spacing(6),
            |col, (idx, reader)| {
                let header = button(text(format!("Reader {}", reader.id)).size(14))
                    .on_press(Message::ToggleReader(idx))
                    .width(Length::Fill)
                    .padding(6);
                let col = col.push(header);
                if !state.expanded.get(idx).copied().unwrap_or(false) {
                    return col;
                }

                let x = reader.position.x.round() as u32;
                let y = reader.position.y.round() as u32;
                let radius = reader.radius_meters.round() as u32;
                let (id_x, id_y, id_r) = (reader.id.clone(), reader.id.clone(), reader.id.clone());
                col.push(
                    column![
                        text(format!("X-{}: {}", reader.id, x)).size(12),
                        slider(0..=grid.width as u32, x, move |v| {
                            Message::SliderMoved(id_x.clone(), Axis::X, v)
                        })
                        .on_release(Message::SliderReleased),
                        text(format!("Y-{}: {}", reader.id, y)).size(12),
                        slider(0..=grid.height as u32, y, move |v| {
                            Message::SliderMoved(id_y.clone(), Axis::Y, v)
                        })
                        .on_release(Message::SliderReleased),
                        text(format!("Radius-{} (m): {}", reader.id, radius)).size(12),
                        slider(
                            RADIUS_MIN_M as u32..=RADIUS_MAX_M as u32,
                            radius,
                            move |v| Message::SliderMoved(id_r.clone(), Axis::Radius, v),
                        )
                        .step(RADIUS_STEP_M as u32)
                        .on_release(Message::SliderReleased),
                    ]
                    .spacing(4)
                    .padding(6),
                )
            },
        );

        let legend = Canvas::new(LegendStrip)
            .width(Length::Fill)
            .height(Length::Fixed(24.0));

        let sidebar = column![
            text("RFID Reader Parameters").size(22),
            scrollable(reader_controls).height(Length::Fill),
            text("Heatmap Legend").size(18),
            legend,
            text(LEGEND_CAPTION).size(12),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let coverage = Canvas::new(CoverageView {
            heatmap: state.heatmap.clone(),
            overlays: state.overlays.clone(),
            grid,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let notes = state
            .frame
            .notes
            .iter()
            .fold(Column::new().spacing(2), |col, note| {
                col.push(text(note.clone()).size(12))
            });

        let main_column = column![
            text("Combined RFID Reader Coverage Map").size(26),
            coverage,
            notes,
            row![
                button("Download as PNG").on_press(Message::Export).padding(10),
                text(state.status.as_str()).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![sidebar, main_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn refresh(&mut self) {
        let frame = self.session.frame();
        if !Arc::ptr_eq(&frame, &self.frame) {
            self.heatmap = heatmap_handle(&self.floorplan, &frame, self.session.heatmap_alpha());
            self.overlays = frame.overlays.clone();
            self.frame = frame;
            let metrics = self.session.metrics();
            self.push_history(format!(
                "Recomputed coverage: {} contour lines (frames {}, cache hits {})",
                self.frame.overlays.contours.len(),
                metrics.frames_composed,
                metrics.cache_hits
            ));
        }
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn heatmap_handle(floorplan: &Floorplan, frame: &CoverageFrame, alpha: f64) -> image::Handle {
    let composed = compose_heatmap(floorplan.image(), &frame.field, alpha);
    image::Handle::from_rgba(composed.width(), composed.height(), composed.into_raw())
}

/// Floorplan with heatmap, scaled to fit, plus overlays drawn in screen space.
struct CoverageView {
    heatmap: image::Handle,
    overlays: OverlaySet,
    grid: GridSize,
}

impl canvas::Program<Message> for CoverageView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        if self.grid.width == 0 || self.grid.height == 0 {
            return vec![frame.into_geometry()];
        }

        let scale = (bounds.width / self.grid.width as f32)
            .min(bounds.height / self.grid.height as f32);
        let size = Size::new(
            self.grid.width as f32 * scale,
            self.grid.height as f32 * scale,
        );
        let origin = Point::new(
            (bounds.width - size.width) / 2.0,
            (bounds.height - size.height) / 2.0,
        );
        frame.draw_image(
            Rectangle::new(origin, size),
            canvas::Image::new(self.heatmap.clone()),
        );

        let mut painter = CanvasPainter {
            frame: &mut frame,
            origin,
            scale,
        };
        paint_overlays(&mut painter, &self.overlays);

        vec![frame.into_geometry()]
    }
}

/// Maps image-pixel overlays onto the canvas frame.
struct CanvasPainter<'a> {
    frame: &'a mut Frame,
    origin: Point,
    scale: f32,
}

impl CanvasPainter<'_> {
    fn map(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.origin.x + x as f32 * self.scale,
            self.origin.y + y as f32 * self.scale,
        )
    }
}

impl OverlayPainter for CanvasPainter<'_> {
    fn ring(&mut self, ring: &BoundaryRing) {
        let radius = ring.radius_px as f32 * self.scale;
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let center = self.map(ring.center.x, ring.center.y);
        let path = Path::circle(center, radius);
        self.frame.stroke(
            &path,
            Stroke::default()
                .with_width(1.5)
                .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.8)),
        );
    }

    fn contour(&mut self, line: &ContourLine) {
        if line.points.len() < 2 {
            return;
        }
        let points: Vec<Point> = line.points.iter().map(|p| self.map(p.x, p.y)).collect();
        let path = Path::new(|builder| {
            builder.move_to(points[0]);
            for point in &points[1..] {
                builder.line_to(*point);
            }
            if line.closed {
                builder.close();
            }
        });
        self.frame.stroke(
            &path,
            Stroke::default()
                .with_width(1.2)
                .with_color(Color::from_rgb(0.08, 0.08, 0.08)),
        );
    }

    fn marker(&mut self, marker: &ReaderMarker) {
        let center = self.map(marker.position.x, marker.position.y);
        self.frame
            .fill(&Path::circle(center, 4.0), Color::from_rgb(0.0, 0.5, 0.0));
        self.frame.fill_text(canvas::Text {
            content: marker.id.clone(),
            position: self.map(marker.label_anchor.x, marker.label_anchor.y),
            color: Color::from_rgb(0.0, 1.0, 0.0),
            size: Pixels(12.0),
            ..canvas::Text::default()
        });
    }
}

/// Jet gradient from weak (left) to strong (right).
struct LegendStrip;

impl canvas::Program<Message> for LegendStrip {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let colors = legend_colors(LEGEND_STOPS);
        let band = bounds.width / colors.len().max(1) as f32;
        for (i, color) in colors.iter().enumerate() {
            let [r, g, b, _] = color.0;
            frame.fill_rectangle(
                Point::new(i as f32 * band, 0.0),
                Size::new(band + 0.5, bounds.height),
                Color::from_rgb8(r, g, b),
            );
        }
        vec![frame.into_geometry()]
    }
}
