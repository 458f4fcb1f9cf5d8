//! `RINEX` revision description
use crate::error::ParsingError;

/// Newest revision this crate can decode
pub const SUPPORTED_VERSION: Version = Version { major: 3, minor: 5 };

/// Version is used to describe RINEX standards revisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

impl Default for Version {
    fn default() -> Self {
        SUPPORTED_VERSION
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('.') {
            Some((major, minor)) => {
                let major = major
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ParsingError::VersionParsing)?;
                let minor = minor.trim();
                // "2.1" is 2.10, "2.11" is 2.11
                let minor = match minor.len() {
                    0 => 0,
                    1 => {
                        minor
                            .parse::<u8>()
                            .map_err(|_| ParsingError::VersionParsing)?
                            * 10
                    },
                    _ => minor
                        .get(..2)
                        .ok_or(ParsingError::VersionParsing)?
                        .parse::<u8>()
                        .map_err(|_| ParsingError::VersionParsing)?,
                };
                Ok(Self { major, minor })
            },
            None => Ok(Self {
                major: s.parse::<u8>().map_err(|_| ParsingError::VersionParsing)?,
                minor: 0,
            }),
        }
    }
}

impl Version {
    /// Builds a new `Version` object
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    /// Returns true if this navigation revision can be decoded
    pub fn is_supported(&self) -> bool {
        self.major == 2 || (self.major == 3 && self.minor <= SUPPORTED_VERSION.minor)
    }
    /// Returns true for revisions that prefix records with a constellation tag
    /// and use the 4 column continuation offset.
    pub(crate) fn is_v3(&self) -> bool {
        self.major > 2
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    #[test]
    fn version_parsing() {
        for (desc, major, minor) in [
            ("2", 2, 0),
            ("2.0", 2, 0),
            ("2.10", 2, 10),
            ("2.11", 2, 11),
            ("2.12", 2, 12),
            ("3.04", 3, 4),
            ("     3.05", 3, 5),
            ("4.00", 4, 0),
        ] {
            let version = Version::from_str(desc).unwrap();
            assert_eq!(version, Version::new(major, minor), "failed for \"{}\"", desc);
        }
        assert!(Version::from_str("v3").is_err());
    }
    #[test]
    fn version_support() {
        assert!(Version::new(2, 0).is_supported());
        assert!(Version::new(2, 12).is_supported());
        assert!(Version::new(3, 4).is_supported());
        assert!(!Version::new(1, 0).is_supported());
        assert!(!Version::new(4, 0).is_supported());
        assert!(Version::new(3, 0).is_v3());
        assert!(!Version::new(2, 11).is_v3());
        assert_eq!(Version::new(2, 1).to_string(), "2.01");
    }
}
