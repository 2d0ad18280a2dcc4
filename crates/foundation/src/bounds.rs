/// Geographic bounding box in WGS84 degrees, grown one coordinate at a time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLatBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl LngLatBounds {
    pub fn empty() -> Self {
        Self {
            west: f64::INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            north: f64::NEG_INFINITY,
        }
    }

    pub fn from_ring(ring: &[[f64; 2]]) -> Self {
        let mut b = Self::empty();
        for &coord in ring {
            b.extend(coord);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.west > self.east || self.south > self.north
    }

    pub fn extend(&mut self, [lng, lat]: [f64; 2]) {
        self.west = self.west.min(lng);
        self.south = self.south.min(lat);
        self.east = self.east.max(lng);
        self.north = self.north.max(lat);
    }

    pub fn center(&self) -> Option<[f64; 2]> {
        if self.is_empty() {
            return None;
        }
        Some([
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
        ])
    }

    /// `[[west, south], [east, north]]`, the form `fitBounds` takes.
    pub fn to_array(&self) -> Option<[[f64; 2]; 2]> {
        if self.is_empty() {
            return None;
        }
        Some([[self.west, self.south], [self.east, self.north]])
    }
}

impl Default for LngLatBounds {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::LngLatBounds;

    #[test]
    fn extends_over_ring() {
        let b = LngLatBounds::from_ring(&[[-106.0, 43.0], [-96.0, 29.5], [-101.0, 44.0]]);
        assert_eq!(b.to_array(), Some([[-106.0, 29.5], [-96.0, 44.0]]));
        assert_eq!(b.center(), Some([-101.0, 36.75]));
    }

    #[test]
    fn empty_has_no_extent() {
        let b = LngLatBounds::empty();
        assert!(b.is_empty());
        assert_eq!(b.to_array(), None);
        assert_eq!(b.center(), None);
    }
}
