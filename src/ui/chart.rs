use crate::theme::Theme;
use eframe::egui::{self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Shape, Stroke};

const Y_TICKS: usize = 3;
const MAX_X_LABELS: usize = 6;
const AXIS_GUTTER: f32 = 36.0;
const LABEL_GUTTER: f32 = 18.0;
const SMOOTH_STEPS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// Smooth curve through every point that never overshoots between them.
    Monotone,
    Step,
}

#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub values: Vec<f64>,
    pub shape: LineShape,
    pub unit: Option<String>,
}

/// Minimal multi-series line chart drawn with the egui painter.
pub struct LineChart<'a> {
    labels: &'a [String],
    hover_labels: &'a [String],
    series: Vec<Series>,
    zero_based: bool,
    height: f32,
}

impl<'a> LineChart<'a> {
    pub fn new(labels: &'a [String], hover_labels: &'a [String]) -> Self {
        Self {
            labels,
            hover_labels,
            series: Vec::new(),
            zero_based: false,
            height: 220.0,
        }
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn zero_based(mut self, zero_based: bool) -> Self {
        self.zero_based = zero_based;
        self
    }

    pub fn show(self, ui: &mut egui::Ui, theme: &Theme) {
        let size = egui::vec2(ui.available_width(), self.height);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let outer = response.rect;
        painter.rect_filled(outer, CornerRadius::same(theme.radius_8), theme.surface_1);

        let plot = Rect::from_min_max(
            Pos2::new(outer.left() + AXIS_GUTTER, outer.top() + theme.spacing_12),
            Pos2::new(outer.right() - theme.spacing_12, outer.bottom() - LABEL_GUTTER),
        );
        let count = self.labels.len();
        let (lo, hi) = value_bounds(
            self.series.iter().flat_map(|series| series.values.iter().copied()),
            self.zero_based,
        );
        let y_of = |value: f64| {
            let t = ((value - lo) / (hi - lo)) as f32;
            plot.bottom() - t * plot.height()
        };
        let x_of = |index: usize| x_position(index, count, plot.left(), plot.width());

        let tick_font = FontId::proportional(10.0);
        for tick in 0..Y_TICKS {
            let value = lo + (hi - lo) * tick as f64 / (Y_TICKS - 1) as f64;
            let y = y_of(value);
            painter.extend(Shape::dashed_line(
                &[Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
                Stroke::new(1.0, theme.grid_line),
                3.0,
                3.0,
            ));
            painter.text(
                Pos2::new(plot.left() - 6.0, y),
                Align2::RIGHT_CENTER,
                format_tick(value),
                tick_font.clone(),
                theme.text_muted,
            );
        }

        for index in label_indices(count, MAX_X_LABELS) {
            painter.text(
                Pos2::new(x_of(index), plot.bottom() + 4.0),
                Align2::CENTER_TOP,
                &self.labels[index],
                tick_font.clone(),
                theme.text_muted,
            );
        }

        for series in &self.series {
            let points = polyline(&series.values, series.shape, &x_of, &y_of);
            if points.len() == 1 {
                painter.circle_filled(points[0], 3.0, series.color);
            } else if points.len() > 1 {
                painter.add(Shape::line(points, Stroke::new(2.0, series.color)));
            }
        }

        let hovered = response
            .hover_pos()
            .and_then(|pos| nearest_index(pos.x, plot.left(), plot.width(), count));
        if let Some(index) = hovered {
            let x = x_of(index);
            painter.line_segment(
                [Pos2::new(x, plot.top()), Pos2::new(x, plot.bottom())],
                Stroke::new(1.0, theme.text_muted),
            );
            for series in &self.series {
                if let Some(value) = series.values.get(index) {
                    painter.circle_filled(Pos2::new(x, y_of(*value)), 4.0, series.color);
                }
            }

            let title = self
                .hover_labels
                .get(index)
                .or_else(|| self.labels.get(index))
                .cloned()
                .unwrap_or_default();
            let series = &self.series;
            response.on_hover_ui_at_pointer(|ui| {
                ui.strong(title);
                for entry in series {
                    if let Some(value) = entry.values.get(index) {
                        let unit = entry
                            .unit
                            .as_deref()
                            .map(|unit| format!(" {unit}"))
                            .unwrap_or_default();
                        ui.colored_label(
                            entry.color,
                            format!("{}: {}{unit}", entry.name, format_tick(*value)),
                        );
                    }
                }
            });
        }

        ui.horizontal(|ui| {
            for series in &self.series {
                ui.colored_label(series.color, format!("● {}", series.name));
            }
        });
    }
}

/// Value range for the y axis with a little headroom; never empty.
pub(crate) fn value_bounds(values: impl Iterator<Item = f64>, zero_based: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if zero_based {
        lo = lo.min(0.0);
    }
    if hi - lo < f64::EPSILON {
        hi += 1.0;
        if !zero_based {
            lo -= 1.0;
        }
    }

    let pad = (hi - lo) * 0.1;
    hi += pad;
    if !zero_based {
        lo -= pad;
    }
    (lo, hi)
}

pub(crate) fn x_position(index: usize, count: usize, left: f32, width: f32) -> f32 {
    if count <= 1 {
        return left + width / 2.0;
    }
    left + width * index as f32 / (count - 1) as f32
}

pub(crate) fn nearest_index(x: f32, left: f32, width: f32, count: usize) -> Option<usize> {
    if count == 0 || x < left || x > left + width {
        return None;
    }
    if count == 1 {
        return Some(0);
    }
    let step = width / (count - 1) as f32;
    let index = ((x - left) / step).round() as usize;
    Some(index.min(count - 1))
}

pub(crate) fn label_indices(count: usize, max_labels: usize) -> Vec<usize> {
    if count == 0 || max_labels == 0 {
        return Vec::new();
    }
    let stride = count.div_ceil(max_labels);
    (0..count).step_by(stride).collect()
}

/// Points of a series; a step line holds each value until the next x.
pub(crate) fn polyline(
    values: &[f64],
    shape: LineShape,
    x_of: impl Fn(usize) -> f32,
    y_of: impl Fn(f64) -> f32,
) -> Vec<Pos2> {
    let anchors: Vec<Pos2> = values
        .iter()
        .enumerate()
        .map(|(index, value)| Pos2::new(x_of(index), y_of(*value)))
        .collect();
    match shape {
        LineShape::Monotone => monotone_curve(&anchors),
        LineShape::Step => step_line(&anchors),
    }
}

fn step_line(anchors: &[Pos2]) -> Vec<Pos2> {
    let mut points: Vec<Pos2> = Vec::with_capacity(anchors.len() * 2);
    for point in anchors {
        if let Some(previous) = points.last().copied() {
            points.push(Pos2::new(point.x, previous.y));
        }
        points.push(*point);
    }
    points
}

/// Cubic Hermite curve with harmonic-mean tangents; flat where neighbours
/// change direction.
fn monotone_curve(anchors: &[Pos2]) -> Vec<Pos2> {
    let count = anchors.len();
    if count < 3 {
        return anchors.to_vec();
    }

    let secants: Vec<f32> = anchors
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x - pair[0].x;
            if dx.abs() < f32::EPSILON {
                0.0
            } else {
                (pair[1].y - pair[0].y) / dx
            }
        })
        .collect();

    let mut tangents = vec![0.0_f32; count];
    tangents[0] = secants[0];
    tangents[count - 1] = secants[count - 2];
    for index in 1..count - 1 {
        let (before, after) = (secants[index - 1], secants[index]);
        if before * after > 0.0 {
            tangents[index] = 2.0 / (1.0 / before + 1.0 / after);
        }
    }

    let mut points = Vec::with_capacity((count - 1) * SMOOTH_STEPS + 1);
    points.push(anchors[0]);
    for index in 0..count - 1 {
        let (start, end) = (anchors[index], anchors[index + 1]);
        let width = end.x - start.x;
        for step in 1..=SMOOTH_STEPS {
            let t = step as f32 / SMOOTH_STEPS as f32;
            let (t2, t3) = (t * t, t * t * t);
            let y = (2.0 * t3 - 3.0 * t2 + 1.0) * start.y
                + (t3 - 2.0 * t2 + t) * width * tangents[index]
                + (3.0 * t2 - 2.0 * t3) * end.y
                + (t3 - t2) * width * tangents[index + 1];
            points.push(Pos2::new(start.x + t * width, y));
        }
    }
    points
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_tick, label_indices, nearest_index, polyline, value_bounds, x_position, LineShape,
        SMOOTH_STEPS,
    };
    use eframe::egui::Pos2;

    #[test]
    fn bounds_pad_the_observed_range() {
        let (lo, hi) = value_bounds([20.0, 30.0].into_iter(), false);
        assert!((lo - 19.0).abs() < 1e-9);
        assert!((hi - 31.0).abs() < 1e-9);
    }

    #[test]
    fn zero_based_bounds_start_at_zero() {
        let (lo, hi) = value_bounds([90.0, 100.0].into_iter(), true);
        assert_eq!(lo, 0.0);
        assert!((hi - 110.0).abs() < 1e-9);
    }

    #[test]
    fn flat_and_empty_series_still_have_a_range() {
        let (lo, hi) = value_bounds([24.0, 24.0].into_iter(), false);
        assert!(lo < 24.0 && hi > 24.0);

        assert_eq!(value_bounds(std::iter::empty(), true), (0.0, 1.0));
        assert_eq!(value_bounds([f64::NAN].into_iter(), false), (0.0, 1.0));
    }

    #[test]
    fn single_point_is_centered() {
        assert_eq!(x_position(0, 1, 10.0, 100.0), 60.0);
        assert_eq!(x_position(0, 3, 10.0, 100.0), 10.0);
        assert_eq!(x_position(2, 3, 10.0, 100.0), 110.0);
    }

    #[test]
    fn hover_snaps_to_nearest_point() {
        assert_eq!(nearest_index(10.0, 10.0, 100.0, 5), Some(0));
        assert_eq!(nearest_index(36.0, 10.0, 100.0, 5), Some(1));
        assert_eq!(nearest_index(110.0, 10.0, 100.0, 5), Some(4));
        assert_eq!(nearest_index(5.0, 10.0, 100.0, 5), None);
        assert_eq!(nearest_index(50.0, 10.0, 100.0, 0), None);
    }

    #[test]
    fn labels_are_thinned_to_the_limit() {
        assert_eq!(label_indices(4, 6), vec![0, 1, 2, 3]);
        assert_eq!(label_indices(30, 6), vec![0, 5, 10, 15, 20, 25]);
        assert!(label_indices(0, 6).is_empty());
    }

    #[test]
    fn step_line_holds_value_until_next_point() {
        let points = polyline(
            &[1.0, 3.0],
            LineShape::Step,
            |index| index as f32 * 10.0,
            |value| value as f32,
        );
        assert_eq!(
            points,
            vec![Pos2::new(0.0, 1.0), Pos2::new(10.0, 1.0), Pos2::new(10.0, 3.0)]
        );

        let short = polyline(&[1.0, 3.0], LineShape::Monotone, |index| index as f32, |v| v as f32);
        assert_eq!(short, vec![Pos2::new(0.0, 1.0), Pos2::new(1.0, 3.0)]);
    }

    #[test]
    fn smooth_line_passes_through_points_without_overshoot() {
        let values = [1.0, 2.0, 10.0, 10.0];
        let points = polyline(
            &values,
            LineShape::Monotone,
            |index| index as f32 * 10.0,
            |value| value as f32,
        );
        assert_eq!(points.len(), 3 * SMOOTH_STEPS + 1);

        for (index, value) in values.iter().enumerate() {
            let anchor = points[index * SMOOTH_STEPS];
            assert!((anchor.x - index as f32 * 10.0).abs() < 1e-4);
            assert!((anchor.y - *value as f32).abs() < 1e-4);
        }
        for pair in points.windows(2) {
            assert!(pair[1].y >= pair[0].y - 1e-4, "curve dips at {pair:?}");
            assert!(pair[1].y <= 10.0 + 1e-4, "curve overshoots at {pair:?}");
        }
        for point in &points[2 * SMOOTH_STEPS..] {
            assert!((point.y - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn ticks_drop_needless_decimals() {
        assert_eq!(format_tick(24.0), "24");
        assert_eq!(format_tick(22.5), "22.5");
    }
}
