use glam::DVec2;

/// One physical display, in global desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges belong to the neighbor.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Inclusive rectangle the pet's top-left corner may occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            p.x.max(self.x_min).min(self.x_max),
            p.y.max(self.y_min).min(self.y_max),
        )
    }

    pub fn contains(&self, p: DVec2) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }

    /// Floor-to-ceiling travel distance.
    pub fn vertical_extent(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Turns the region list into movable bounds for the active region.
#[derive(Debug, Clone)]
pub struct BoundsResolver {
    regions: Vec<Region>,
    footprint: DVec2,
    margin: f64,
    active: usize,
    bounds: Bounds,
}

impl BoundsResolver {
    /// `footprint` is the pet's (width, height). Starts on region 0.
    pub fn new(regions: Vec<Region>, footprint: DVec2, margin: f64) -> Self {
        debug_assert!(!regions.is_empty(), "at least one region is required");
        let bounds = compute(&regions[0], footprint, margin);
        Self {
            regions,
            footprint,
            margin,
            active: 0,
            bounds,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn footprint(&self) -> DVec2 {
        self.footprint
    }

    /// Switch to region `index`. Out of range is a caller bug.
    pub fn set_active(&mut self, index: usize) {
        debug_assert!(index < self.regions.len(), "region {index} out of range");
        if index < self.regions.len() {
            self.active = index;
            self.bounds = compute(&self.regions[index], self.footprint, self.margin);
        }
    }

    /// First region containing the center of a pet whose top-left is `top_left`.
    pub fn region_at(&self, top_left: DVec2) -> Option<usize> {
        let center = top_left + self.footprint * 0.5;
        self.regions.iter().position(|r| r.contains(center))
    }

    /// Adopt the region under the pet, if any. Returns true when it changed.
    pub fn switch_to_region_at(&mut self, top_left: DVec2) -> bool {
        match self.region_at(top_left) {
            Some(i) if i != self.active => {
                self.set_active(i);
                log::debug!("Switched to region {i}: {:?}", self.regions[i]);
                true
            }
            _ => false,
        }
    }

    /// Replace the region set (display hot-plug). Keeps the active index
    /// when it still exists, otherwise falls back to region 0.
    pub fn set_regions(&mut self, regions: Vec<Region>) {
        debug_assert!(!regions.is_empty(), "at least one region is required");
        if regions.is_empty() {
            return;
        }
        let active = if self.active < regions.len() { self.active } else { 0 };
        self.regions = regions;
        self.set_active(active);
    }
}

fn compute(region: &Region, footprint: DVec2, margin: f64) -> Bounds {
    let b = Bounds {
        x_min: region.x + margin,
        x_max: region.x + region.width - footprint.x - margin,
        y_min: region.y + margin,
        y_max: region.y + region.height - footprint.y - margin,
    };
    debug_assert!(
        b.x_min <= b.x_max && b.y_min <= b.y_max,
        "region {region:?} too small for a {footprint} pet"
    );
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_screens() -> BoundsResolver {
        BoundsResolver::new(
            vec![
                Region::new(0.0, 0.0, 1920.0, 1080.0),
                Region::new(1920.0, 0.0, 1280.0, 1024.0),
            ],
            DVec2::new(128.0, 148.0),
            2.0,
        )
    }

    #[test]
    fn bounds_inset_by_margin_and_footprint() {
        let r = two_screens();
        let b = r.bounds();
        assert_eq!(b.x_min, 2.0);
        assert_eq!(b.x_max, 1920.0 - 128.0 - 2.0);
        assert_eq!(b.y_min, 2.0);
        assert_eq!(b.y_max, 1080.0 - 148.0 - 2.0);
    }

    #[test]
    fn region_lookup_uses_center() {
        let r = two_screens();
        // Top-left still on screen 0 but center past the seam.
        assert_eq!(r.region_at(DVec2::new(1900.0, 100.0)), Some(1));
        assert_eq!(r.region_at(DVec2::new(1700.0, 100.0)), Some(0));
        assert_eq!(r.region_at(DVec2::new(5000.0, 100.0)), None);
    }

    #[test]
    fn switching_recomputes_bounds() {
        let mut r = two_screens();
        assert!(r.switch_to_region_at(DVec2::new(2000.0, 500.0)));
        assert_eq!(r.active_index(), 1);
        assert_eq!(r.bounds().x_min, 1922.0);
        assert_eq!(r.bounds().y_max, 1024.0 - 148.0 - 2.0);
        assert!(!r.switch_to_region_at(DVec2::new(2000.0, 500.0)));
    }

    #[test]
    fn set_regions_falls_back_to_first() {
        let mut r = two_screens();
        r.set_active(1);
        r.set_regions(vec![Region::new(0.0, 0.0, 800.0, 600.0)]);
        assert_eq!(r.active_index(), 0);
        assert_eq!(r.bounds().x_max, 800.0 - 128.0 - 2.0);
    }

    #[test]
    fn clamp_pins_to_edges() {
        let b = two_screens().bounds();
        let p = b.clamp(DVec2::new(-50.0, 5000.0));
        assert_eq!(p, DVec2::new(b.x_min, b.y_max));
        assert!(b.contains(p));
    }
}
