use rand::Rng;
use std::f64::consts::TAU;

/// One point light, fixed for the whole run.
///
/// Stored in Cartesian form around the tunnel axis; `z` runs along the axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Base size drawn at generation time. The renderer sizes stars from distance alone, so
    /// this is carried as data only.
    pub size: f64,
}

impl Star {
    /// Distance from the tunnel axis.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Bounds for [`StarField::generate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldBounds {
    pub corridor_radius: f64,
    pub field_radius: f64,
    pub tunnel_length: f64,
    pub max_size: f64,
}

/// Immutable set of stars filling a hollow cylinder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    /// Sample `count` stars independently from `rng`.
    ///
    /// Radius and angle are drawn uniformly, not area-weighted, so stars crowd towards the
    /// corridor wall.
    pub fn generate<R: Rng + ?Sized>(count: usize, bounds: FieldBounds, rng: &mut R) -> Self {
        let FieldBounds {
            corridor_radius,
            field_radius,
            tunnel_length,
            max_size,
        } = bounds;

        let stars = (0..count)
            .map(|_| {
                let distance = rng.gen_range(corridor_radius..=field_radius);
                let angle = rng.gen_range(0.0..TAU);
                let z = rng.gen_range(0.0..tunnel_length);
                let size = rng.gen_range(0.0..=max_size);
                Star {
                    x: distance * angle.cos(),
                    y: distance * angle.sin(),
                    z,
                    size,
                }
            })
            .collect();
        Self { stars }
    }

    /// Build a field from explicit stars.
    pub fn from_stars(stars: Vec<Star>) -> Self {
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/star.rs"]
mod tests;
