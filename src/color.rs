// Color helpers shared by matting and frame preparation.
// Similarity is an L∞ bound: every channel must be within `tolerance`.

use std::fmt;
use std::str::FromStr;

use image::Rgb;

use crate::error::Error;

/// Guard tolerance used to keep near-black subject pixels opaque.
pub const BLACK_GUARD_TOLERANCE: u8 = 30;

/// Tolerance for treating a pixel as "key colored" after resampling.
pub const KEY_TOLERANCE: u8 = 50;

pub const BLACK: [u8; 3] = [0, 0, 0];

/// True iff every channel pair differs by at most `tolerance`.
/// Only the channels present in both slices are compared, so callers
/// can pass `&px[..3]` to ignore alpha.
#[inline]
pub fn similar(a: &[u8], b: &[u8], tolerance: u8) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// True when the RGB part of `px` is within the black guard.
#[inline]
pub fn is_near_black(px: &[u8]) -> bool {
    similar(&px[..3.min(px.len())], &BLACK, BLACK_GUARD_TOLERANCE)
}

/// The reserved color a color-keyed window treats as see-through.
/// Threaded through preparation and the controller as a value, so two
/// overlays may use different keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransparencyKey(pub Rgb<u8>);

impl TransparencyKey {
    pub const MAGENTA: Self = Self(Rgb([255, 0, 255]));

    pub fn rgb(&self) -> [u8; 3] {
        self.0.0
    }

    /// Packed as 0x00RRGGBB, the layout minifb expects.
    pub fn to_0rgb(&self) -> u32 {
        let [r, g, b] = self.0.0;
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }
}

impl Default for TransparencyKey {
    fn default() -> Self {
        Self::MAGENTA
    }
}

impl fmt::Display for TransparencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for TransparencyKey {
    type Err = Error;

    /// Accepts `ff00ff` or `#ff00ff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::configuration(format!(
                "key color must be 6 hex digits, got {s:?}"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| Error::configuration(format!("bad hex in key color {s:?}")))
        };
        Ok(Self(Rgb([channel(0)?, channel(2)?, channel(4)?])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similar_is_reflexive() {
        for c in [[0u8, 0, 0], [255, 0, 255], [17, 200, 3]] {
            for t in [0u8, 1, 10, 255] {
                assert!(similar(&c, &c, t));
            }
        }
    }

    #[test]
    fn similar_is_symmetric() {
        let a = [10u8, 120, 250];
        let b = [30u8, 100, 255];
        for t in [0u8, 19, 20, 21, 100] {
            assert_eq!(similar(&a, &b, t), similar(&b, &a, t));
        }
    }

    #[test]
    fn similar_uses_max_channel_distance() {
        // Each channel is 20 apart: L∞ = 20 even though Euclidean is ~34.6.
        assert!(similar(&[100, 100, 100], &[120, 120, 120], 20));
        assert!(!similar(&[100, 100, 100], &[121, 100, 100], 20));
    }

    #[test]
    fn similar_ignores_channels_not_supplied() {
        let rgba = [200u8, 10, 10, 0];
        assert!(similar(&rgba[..3], &[200, 10, 10], 0));
    }

    #[test]
    fn black_guard() {
        assert!(is_near_black(&[30, 30, 30, 255]));
        assert!(!is_near_black(&[31, 0, 0]));
    }

    #[test]
    fn key_parses_hex() {
        let k: TransparencyKey = "#00ff7f".parse().unwrap();
        assert_eq!(k.rgb(), [0, 255, 127]);
        assert_eq!(k.to_0rgb(), 0x0000_FF7F);
        assert_eq!(k.to_string(), "#00ff7f");
        assert_eq!(TransparencyKey::default().to_0rgb(), 0x00FF_00FF);
    }

    #[test]
    fn key_rejects_garbage() {
        assert!("ff00".parse::<TransparencyKey>().is_err());
        assert!("zz00ff".parse::<TransparencyKey>().is_err());
    }
}
