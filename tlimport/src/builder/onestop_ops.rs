use geo::{Centroid, MultiPoint, Point};
use regex::{Regex, RegexBuilder};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::copier::CopierError;

/// geohash length of a stop onestop id, and the starting length of a
/// consensus geohash.
pub const GEOHASH_PRECISION: usize = 10;

/// normalizes names for use in onestop ids.
#[derive(Debug, Clone)]
pub struct NameFilter {
    separators: Regex,
    disallowed: Regex,
}

impl NameFilter {
    /// characters that are replaced with `~`
    pub const SEPARATOR_REGEX: &str = r"[\-:&@/]";
    /// characters removed after separators are replaced
    pub const DISALLOWED_REGEX: &str = r"[^a-z0-9~><]";

    pub fn new() -> Result<NameFilter, CopierError> {
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .build()
                .map_err(|e| CopierError::InternalError(format!("invalid name filter pattern '{pattern}': {e}")))
        };
        Ok(NameFilter {
            separators: build(Self::SEPARATOR_REGEX)?,
            disallowed: build(Self::DISALLOWED_REGEX)?,
        })
    }

    /// decomposes accented characters, drops the accents and lower-cases the
    /// result before replacing separators and removing everything else.
    pub fn apply(&self, name: &str) -> String {
        let folded: String = name
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase();
        let separated = self.separators.replace_all(&folded, "~");
        self.disallowed.replace_all(&separated, "").into_owned()
    }
}

pub fn encode(point: &Point<f64>, len: usize) -> Result<String, CopierError> {
    let coord = geohash::Coord {
        x: point.x(),
        y: point.y(),
    };
    geohash::encode(coord, len)
        .map_err(|e| CopierError::InternalError(format!("unable to geohash {point:?}: {e}")))
}

/// the longest prefix of the centroid's geohash such that every point's
/// geohash at that length is either the prefix or one of its 8 neighbors.
/// returns None for an empty input or when no single-character cell and
/// its neighbors cover every point.
pub fn consensus_geohash(points: &[Point<f64>]) -> Result<Option<String>, CopierError> {
    let Some(centroid) = MultiPoint::new(points.to_vec()).centroid() else {
        return Ok(None);
    };
    let full = encode(&centroid, GEOHASH_PRECISION)?;
    for len in (1..=GEOHASH_PRECISION).rev() {
        let prefix = &full[..len];
        let neighbors = geohash::neighbors(prefix)
            .map_err(|e| CopierError::InternalError(format!("unable to find neighbors of '{prefix}': {e}")))?;
        let cells = [
            neighbors.n,
            neighbors.ne,
            neighbors.e,
            neighbors.se,
            neighbors.s,
            neighbors.sw,
            neighbors.w,
            neighbors.nw,
        ];
        let mut covered = true;
        for point in points.iter() {
            let hash = encode(point, len)?;
            if hash != prefix && !cells.contains(&hash) {
                covered = false;
                break;
            }
        }
        if covered {
            return Ok(Some(prefix.to_string()));
        }
    }
    Ok(None)
}
