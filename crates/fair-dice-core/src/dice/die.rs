//! Die with a fixed, ordered face list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors building a die
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DieError {
    #[error("a die needs at least one face")]
    Empty,

    #[error("invalid face '{0}': faces must be integers")]
    InvalidFace(String),
}

/// Immutable face sequence; rolls index into it modulo its length
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Die {
    faces: Vec<i64>,
}

impl Die {
    pub fn new(faces: Vec<i64>) -> Result<Self, DieError> {
        if faces.is_empty() {
            return Err(DieError::Empty);
        }
        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[i64] {
        &self.faces
    }

    /// Number of faces, always at least one
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face count as a round range. Faces beyond `u32::MAX` are unreachable
    /// by a round, so the count saturates.
    pub fn range(&self) -> u32 {
        u32::try_from(self.faces.len()).unwrap_or(u32::MAX)
    }

    /// Face at `index` reduced to a non-negative residue modulo the face count
    pub fn roll(&self, index: i64) -> i64 {
        // len >= 1 and fits in i64 for any allocatable Vec
        let len = self.faces.len() as i64;
        let slot = index.rem_euclid(len) as usize;
        self.faces[slot]
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<String> = self.faces.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", faces.join(","))
    }
}

impl FromStr for Die {
    type Err = DieError;

    /// Parse `2,2,4,4,9,9`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DieError::Empty);
        }
        let faces = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<i64>()
                    .map_err(|_| DieError::InvalidFace(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Die::new(faces)
    }
}

impl TryFrom<Vec<i64>> for Die {
    type Error = DieError;

    fn try_from(faces: Vec<i64>) -> Result<Self, Self::Error> {
        Die::new(faces)
    }
}

impl From<Die> for Vec<i64> {
    fn from(die: Die) -> Self {
        die.faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die(faces: &[i64]) -> Die {
        Die::new(faces.to_vec()).unwrap()
    }

    #[test]
    fn test_empty_die_rejected() {
        assert_eq!(Die::new(vec![]).unwrap_err(), DieError::Empty);
        assert_eq!("".parse::<Die>().unwrap_err(), DieError::Empty);
    }

    #[test]
    fn test_roll_within_length() {
        let d = die(&[1, 1, 6, 6, 8, 8]);
        assert_eq!(d.roll(0), 1);
        assert_eq!(d.roll(2), 6);
        assert_eq!(d.roll(5), 8);
    }

    #[test]
    fn test_roll_wraps_at_and_beyond_length() {
        let d = die(&[1, 1, 6, 6, 8, 8]);
        assert_eq!(d.roll(6), d.roll(0));
        assert_eq!(d.roll(11), 8);
        assert_eq!(d.roll(6 * 1000 + 3), 6);
    }

    #[test]
    fn test_roll_negative_index_normalized() {
        let d = die(&[10, 20, 30]);
        assert_eq!(d.roll(-1), 30);
        assert_eq!(d.roll(-3), 10);
        assert_eq!(d.roll(i64::MIN), d.roll(i64::MIN.rem_euclid(3)));
    }

    #[test]
    fn test_roll_is_pure() {
        let d = die(&[2, 2, 4, 4, 9, 9]);
        for index in -12..12 {
            assert_eq!(d.roll(index), d.roll(index));
        }
    }

    #[test]
    fn test_single_face() {
        let d = die(&[7]);
        assert_eq!(d.roll(123), 7);
        assert_eq!(d.range(), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let d: Die = " 2,2, 4,4,9,9 ".parse().unwrap();
        assert_eq!(d.faces(), &[2, 2, 4, 4, 9, 9]);
        assert_eq!(d.to_string(), "2,2,4,4,9,9");
        assert_eq!(d.face_count(), 6);
    }

    #[test]
    fn test_parse_negative_faces() {
        let d: Die = "-1,0,3".parse().unwrap();
        assert_eq!(d.faces(), &[-1, 0, 3]);
    }

    #[test]
    fn test_parse_rejects_bad_faces() {
        assert_eq!(
            "1,x,3".parse::<Die>().unwrap_err(),
            DieError::InvalidFace("x".into())
        );
        assert_eq!(
            "1,,3".parse::<Die>().unwrap_err(),
            DieError::InvalidFace("".into())
        );
        assert_eq!(
            "1.5,2".parse::<Die>().unwrap_err(),
            DieError::InvalidFace("1.5".into())
        );
    }

    #[test]
    fn test_serde_as_face_list() {
        let d = die(&[3, 3, 5]);
        assert_eq!(serde_json::to_string(&d).unwrap(), "[3,3,5]");
        assert!(serde_json::from_str::<Die>("[]").is_err());
    }
}
