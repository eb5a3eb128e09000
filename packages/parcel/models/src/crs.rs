//! Coordinate reference system identifiers.
//!
//! A [`Crs`] is an EPSG code with geographic WGS84 (EPSG:4326, also
//! spelled `OGC:CRS84`) singled out, since that is the CRS every dataset
//! is normalized to. Whether a given code can actually be reprojected is
//! decided by the spatial layer, which owns the projection definitions.

use serde::{Deserialize, Serialize};

/// EPSG code for geographic WGS84.
pub const EPSG_WGS84: u32 = 4326;

/// EPSG code for WGS 84 / UTM zone 16N, the planar CRS used for
/// proximity buffering in southeastern Wisconsin.
pub const EPSG_UTM_16N: u32 = 32616;

/// A coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Crs {
    /// Geographic longitude/latitude on the WGS84 datum.
    Wgs84,
    /// Any other CRS in the EPSG registry.
    Epsg {
        /// The registry code, never 4326.
        code: u32,
    },
}

impl Crs {
    /// The CRS for an EPSG code. 4326 maps to [`Crs::Wgs84`].
    #[must_use]
    pub const fn from_epsg(code: u32) -> Self {
        if code == EPSG_WGS84 {
            Self::Wgs84
        } else {
            Self::Epsg { code }
        }
    }

    /// Resolves an `AUTHORITY:CODE` identifier such as `"EPSG:32616"` or
    /// `"OGC:CRS84"`. Also accepts the URN form
    /// `"urn:ogc:def:crs:EPSG::4326"`.
    ///
    /// Returns `None` for authorities other than EPSG and OGC.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        let (authority, code) = if let Some(rest) = identifier.strip_prefix("urn:ogc:def:crs:") {
            let mut parts = rest.split(':');
            let authority = parts.next()?;
            let code = parts.next_back()?;
            (authority, code)
        } else {
            identifier.split_once(':')?
        };

        match authority.to_ascii_uppercase().as_str() {
            "EPSG" => Some(Self::from_epsg(code.parse().ok()?)),
            "OGC" if code.eq_ignore_ascii_case("CRS84") => Some(Self::Wgs84),
            _ => None,
        }
    }

    /// The EPSG code of this CRS.
    #[must_use]
    pub const fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => EPSG_WGS84,
            Self::Epsg { code } => code,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_roundtrip() {
        for code in [4326, 3071, 3857, 32616, 32733] {
            assert_eq!(Crs::from_epsg(code).epsg(), code);
        }
    }

    #[test]
    fn wgs84_code_is_normalized() {
        assert_eq!(Crs::from_epsg(EPSG_WGS84), Crs::Wgs84);
        assert_eq!(Crs::from_epsg(EPSG_UTM_16N), Crs::Epsg { code: 32616 });
    }

    #[test]
    fn parses_identifiers() {
        assert_eq!(Crs::from_identifier("EPSG:4326"), Some(Crs::Wgs84));
        assert_eq!(Crs::from_identifier("OGC:CRS84"), Some(Crs::Wgs84));
        assert_eq!(
            Crs::from_identifier("urn:ogc:def:crs:EPSG::32616"),
            Some(Crs::Epsg { code: 32616 })
        );
        assert_eq!(Crs::from_identifier("epsg:3857"), Some(Crs::Epsg { code: 3857 }));
        assert_eq!(Crs::from_identifier("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(Crs::Wgs84));
        assert_eq!(Crs::from_identifier("ESRI:102100"), None);
        assert_eq!(Crs::from_identifier("EPSG:north"), None);
        assert_eq!(Crs::from_identifier("garbage"), None);
    }

    #[test]
    fn displays_as_epsg() {
        assert_eq!(Crs::from_epsg(EPSG_UTM_16N).to_string(), "EPSG:32616");
        assert_eq!(Crs::Wgs84.to_string(), "EPSG:4326");
    }
}
