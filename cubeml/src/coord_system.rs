//! Coordinate reference systems.

use derive_more::From;
use thiserror::Error;

/// An invalid coordinate system parameter.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("invalid coordinate system parameter `{parameter}` = {value}: {reason}")]
pub struct CoordSystemError {
    /// The parameter name.
    pub parameter: &'static str,
    /// The parameter value.
    pub value: f64,
    /// Why it is invalid.
    pub reason: &'static str,
}

fn check_axis(parameter: &'static str, value: f64) -> Result<f64, CoordSystemError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CoordSystemError {
            parameter,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn check_angle(parameter: &'static str, value: f64, limit: f64) -> Result<f64, CoordSystemError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(CoordSystemError {
            parameter,
            value,
            reason: "out of range",
        })
    }
}

/// The figure of the earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ellipsoid {
    /// A sphere.
    Sphere {
        /// The radius in metres.
        earth_radius: f64,
    },
    /// An oblate spheroid.
    Spheroid {
        /// The equatorial radius in metres.
        semi_major_axis: f64,
        /// The polar radius in metres.
        semi_minor_axis: f64,
    },
}

/// A geographic (latitude/longitude) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeogCs {
    ellipsoid: Ellipsoid,
}

impl GeogCs {
    /// A spherical geographic coordinate system.
    ///
    /// # Errors
    /// Returns [`CoordSystemError`] if `earth_radius` is not positive and finite.
    pub fn sphere(earth_radius: f64) -> Result<Self, CoordSystemError> {
        Ok(Self {
            ellipsoid: Ellipsoid::Sphere {
                earth_radius: check_axis("earth_radius", earth_radius)?,
            },
        })
    }

    /// A spheroidal geographic coordinate system.
    ///
    /// A spheroid with equal axes is a sphere.
    ///
    /// # Errors
    /// Returns [`CoordSystemError`] if an axis is not positive and finite,
    /// or the minor axis exceeds the major axis.
    #[allow(clippy::float_cmp)]
    pub fn spheroid(semi_major_axis: f64, semi_minor_axis: f64) -> Result<Self, CoordSystemError> {
        let semi_major_axis = check_axis("semi_major_axis", semi_major_axis)?;
        let semi_minor_axis = check_axis("semi_minor_axis", semi_minor_axis)?;
        if semi_minor_axis > semi_major_axis {
            return Err(CoordSystemError {
                parameter: "semi_minor_axis",
                value: semi_minor_axis,
                reason: "exceeds the semi-major axis",
            });
        }
        if semi_major_axis == semi_minor_axis {
            return Self::sphere(semi_major_axis);
        }
        Ok(Self {
            ellipsoid: Ellipsoid::Spheroid {
                semi_major_axis,
                semi_minor_axis,
            },
        })
    }

    /// The ellipsoid.
    #[must_use]
    pub const fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// The equatorial radius in metres.
    #[must_use]
    pub const fn semi_major_axis(&self) -> f64 {
        match self.ellipsoid {
            Ellipsoid::Sphere { earth_radius } => earth_radius,
            Ellipsoid::Spheroid {
                semi_major_axis, ..
            } => semi_major_axis,
        }
    }

    /// The polar radius in metres.
    #[must_use]
    pub const fn semi_minor_axis(&self) -> f64 {
        match self.ellipsoid {
            Ellipsoid::Sphere { earth_radius } => earth_radius,
            Ellipsoid::Spheroid {
                semi_minor_axis, ..
            } => semi_minor_axis,
        }
    }
}

impl std::fmt::Display for GeogCs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ellipsoid {
            Ellipsoid::Sphere { earth_radius } => write!(f, "GeogCS({earth_radius:?})"),
            Ellipsoid::Spheroid {
                semi_major_axis,
                semi_minor_axis,
            } => write!(
                f,
                "GeogCS(semi_major_axis={semi_major_axis:?}, semi_minor_axis={semi_minor_axis:?})"
            ),
        }
    }
}

/// A geographic coordinate system on a rotated pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedGeogCs {
    grid_north_pole_latitude: f64,
    grid_north_pole_longitude: f64,
    north_pole_grid_longitude: f64,
    ellipsoid: GeogCs,
}

impl RotatedGeogCs {
    /// Create a rotated pole coordinate system, with angles in degrees.
    ///
    /// # Errors
    /// Returns [`CoordSystemError`] if the pole latitude is outside `[-90, 90]` or a longitude is outside `[-360, 360]`.
    pub fn new(
        grid_north_pole_latitude: f64,
        grid_north_pole_longitude: f64,
        north_pole_grid_longitude: f64,
        ellipsoid: GeogCs,
    ) -> Result<Self, CoordSystemError> {
        Ok(Self {
            grid_north_pole_latitude: check_angle(
                "grid_north_pole_latitude",
                grid_north_pole_latitude,
                90.0,
            )?,
            grid_north_pole_longitude: check_angle(
                "grid_north_pole_longitude",
                grid_north_pole_longitude,
                360.0,
            )?,
            north_pole_grid_longitude: check_angle(
                "north_pole_grid_longitude",
                north_pole_grid_longitude,
                360.0,
            )?,
            ellipsoid,
        })
    }

    /// The true latitude of the rotated pole in degrees.
    #[must_use]
    pub const fn grid_north_pole_latitude(&self) -> f64 {
        self.grid_north_pole_latitude
    }

    /// The true longitude of the rotated pole in degrees.
    #[must_use]
    pub const fn grid_north_pole_longitude(&self) -> f64 {
        self.grid_north_pole_longitude
    }

    /// The longitude of the true north pole in the rotated grid, in degrees.
    #[must_use]
    pub const fn north_pole_grid_longitude(&self) -> f64 {
        self.north_pole_grid_longitude
    }

    /// The underlying geographic coordinate system.
    #[must_use]
    pub const fn ellipsoid(&self) -> &GeogCs {
        &self.ellipsoid
    }
}

impl std::fmt::Display for RotatedGeogCs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RotatedGeogCS({:?}, {:?}, north_pole_grid_longitude={:?}, ellipsoid={})",
            self.grid_north_pole_latitude,
            self.grid_north_pole_longitude,
            self.north_pole_grid_longitude,
            self.ellipsoid
        )
    }
}

/// A coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, From)]
pub enum CoordSystem {
    /// Latitude/longitude.
    Geog(GeogCs),
    /// Latitude/longitude on a rotated pole.
    RotatedGeog(RotatedGeogCs),
}

impl std::fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geog(cs) => cs.fmt(f),
            Self::RotatedGeog(cs) => cs.fmt(f),
        }
    }
}
