use crate::{error::EquicubeResult, raster::{Channels, SourceImage}};

/// Synthetic equirectangular test pattern for manual visual verification:
/// red encodes longitude (black at −π, full red just before +π wraps) and
/// green encodes latitude (black at the north pole, full green at the
/// south). A correct conversion shows the red ramp circling the four
/// equatorial faces and the py/ny faces dominated by low/high green.
pub fn testcard(width: u32, height: u32) -> EquicubeResult<SourceImage> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    let x_denom = width.saturating_sub(1).max(1);
    let y_denom = height.saturating_sub(1).max(1);
    for y in 0..height {
        let g = (u64::from(y) * 255 / u64::from(y_denom)) as u8;
        for x in 0..width {
            let r = (u64::from(x) * 255 / u64::from(x_denom)) as u8;
            data.extend_from_slice(&[r, g, 0]);
        }
    }
    SourceImage::from_raw(width, height, Channels::Rgb, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradients_run_left_to_right_and_top_to_bottom() {
        let img = testcard(16, 8).unwrap();
        assert_eq!(img.pixel(0, 0), &[0, 0, 0]);
        assert_eq!(img.pixel(15, 0), &[255, 0, 0]);
        assert_eq!(img.pixel(0, 7), &[0, 255, 0]);
        assert_eq!(img.pixel(15, 7), &[255, 255, 0]);
    }

    #[test]
    fn degenerate_single_row_still_builds() {
        let img = testcard(1, 1).unwrap();
        assert_eq!(img.pixel(0, 0), &[0, 0, 0]);
    }
}
