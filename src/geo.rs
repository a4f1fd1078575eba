//! Viewport math for the risk map.

/// Nominal map size in screen pixels. Padding and marker radii are given in
/// pixels of this canvas and converted to degrees.
pub const MAP_SIZE_PX: (f64, f64) = (640.0, 460.0);
pub const FIT_PADDING_PX: f64 = 25.0;

/// Smallest span the view will zoom to, so a lone marker is not fitted to
/// a zero-width box.
const MIN_SPAN_DEG: f64 = 0.5;

const INITIAL_CENTER: (f64, f64) = (39.5, -98.35);
const INITIAL_SPAN: (f64, f64) = (30.0, 60.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around(lat: f64, lon: f64, lat_span: f64, lon_span: f64) -> Self {
        Self {
            south: lat - lat_span / 2.0,
            north: lat + lat_span / 2.0,
            west: lon - lon_span / 2.0,
            east: lon + lon_span / 2.0,
        }
    }

    /// Smallest box holding every `(lat, lon)`; `None` for no points.
    pub fn enclosing(points: &[(f64, f64)]) -> Option<Self> {
        let (&(lat, lon), rest) = points.split_first()?;
        let mut bounds = Self {
            south: lat,
            north: lat,
            west: lon,
            east: lon,
        };
        for &(lat, lon) in rest {
            bounds.south = bounds.south.min(lat);
            bounds.north = bounds.north.max(lat);
            bounds.west = bounds.west.min(lon);
            bounds.east = bounds.east.max(lon);
        }
        Some(bounds)
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }

    /// Grows the box so its content keeps `padding_px` of free space on
    /// each side of a `size_px` canvas.
    pub fn padded(self, padding_px: f64, size_px: (f64, f64)) -> Self {
        let grow = |span: f64, size: f64| {
            let inner = (size - 2.0 * padding_px).max(1.0);
            span.max(MIN_SPAN_DEG) * size / inner
        };
        let lat_span = grow(self.lat_span(), size_px.1);
        let lon_span = grow(self.lon_span(), size_px.0);
        Self::around(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
            lat_span,
            lon_span,
        )
    }

    /// Degrees per screen pixel along (lat, lon) for a canvas of `size_px`.
    pub fn degrees_per_px(&self, size_px: (f64, f64)) -> (f64, f64) {
        (self.lat_span() / size_px.1, self.lon_span() / size_px.0)
    }
}

/// The map camera. It refits to the markers whenever the set of marker
/// positions changes and stays put when there are none.
#[derive(Debug, Clone)]
pub struct MapView {
    bounds: Bounds,
    fitted: Vec<(f64, f64)>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            bounds: Bounds::around(INITIAL_CENTER.0, INITIAL_CENTER.1, INITIAL_SPAN.0, INITIAL_SPAN.1),
            fitted: Vec::new(),
        }
    }
}

impl MapView {
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns true when the camera moved.
    pub fn sync(&mut self, points: &[(f64, f64)]) -> bool {
        if points.is_empty() {
            return false;
        }
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        if sorted == self.fitted {
            return false;
        }
        let Some(enclosing) = Bounds::enclosing(&sorted) else {
            return false;
        };
        self.bounds = enclosing.padded(FIT_PADDING_PX, MAP_SIZE_PX);
        self.fitted = sorted;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTAH: [(f64, f64); 3] = [(40.76, -111.89), (37.10, -113.58), (41.74, -111.83)];

    #[test]
    fn fit_contains_every_point_with_padding() {
        let mut view = MapView::default();
        assert!(view.sync(&UTAH));
        let bounds = view.bounds();
        let (lat_per_px, lon_per_px) = bounds.degrees_per_px(MAP_SIZE_PX);
        let pad_lat = FIT_PADDING_PX * lat_per_px;
        let pad_lon = FIT_PADDING_PX * lon_per_px;
        for (lat, lon) in UTAH {
            assert!(bounds.contains(lat, lon));
            assert!(lat - bounds.south >= pad_lat - 1e-9);
            assert!(bounds.north - lat >= pad_lat - 1e-9);
            assert!(lon - bounds.west >= pad_lon - 1e-9);
            assert!(bounds.east - lon >= pad_lon - 1e-9);
        }
    }

    #[test]
    fn empty_set_leaves_the_camera_alone() {
        let mut view = MapView::default();
        let before = view.bounds();
        assert!(!view.sync(&[]));
        assert_eq!(view.bounds(), before);

        view.sync(&UTAH);
        let fitted = view.bounds();
        assert!(!view.sync(&[]));
        assert_eq!(view.bounds(), fitted);
    }

    #[test]
    fn refits_only_when_the_set_changes() {
        let mut view = MapView::default();
        assert!(view.sync(&UTAH));
        let mut shuffled = UTAH;
        shuffled.reverse();
        assert!(!view.sync(&shuffled));
        assert!(view.sync(&UTAH[..2]));
    }

    #[test]
    fn single_point_gets_a_minimum_span() {
        let mut view = MapView::default();
        view.sync(&[(40.0, -111.0)]);
        let bounds = view.bounds();
        assert!(bounds.contains(40.0, -111.0));
        assert!(bounds.lat_span() >= MIN_SPAN_DEG);
        assert!(bounds.lon_span() >= MIN_SPAN_DEG);
    }

    #[test]
    fn initial_view_covers_the_contiguous_us() {
        let bounds = MapView::default().bounds();
        assert!(bounds.contains(39.5, -98.35));
        assert!(bounds.contains(47.6, -122.3));
        assert!(bounds.contains(25.8, -80.2));
    }
}
