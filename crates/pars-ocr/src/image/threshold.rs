use image::{GrayImage, Luma};
use imageproc::integral_image::{integral_image, sum_image_pixels};

/// Local-mean binarization.
///
/// Each output pixel is 255 when the source pixel exceeds the rounded mean of
/// its `block_size` x `block_size` neighbourhood minus `offset`, and 0
/// otherwise. Outside the image the edge pixels are repeated, so every mean is
/// taken over exactly `block_size²` samples.
pub fn adaptive_mean_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let radius = block_size / 2;
    let span = 2 * radius;
    let padded = replicate_border(image, radius);
    let integral = integral_image::<_, u64>(&padded);
    let count = u64::from(span + 1) * u64::from(span + 1);

    for y in 0..height {
        for x in 0..width {
            // Padded coordinates: the window around (x, y) starts at (x, y).
            let sum = sum_image_pixels(&integral, x, y, x + span, y + span)[0];
            let mean = ((sum + count / 2) / count) as i32;

            let pixel = i32::from(image.get_pixel(x, y)[0]);
            let value = if pixel - mean > -offset { 255 } else { 0 };
            out.put_pixel(x, y, Luma([value]));
        }
    }

    out
}

/// Copy of `image` grown by `radius` on every side, edge pixels repeated.
fn replicate_border(image: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width + 2 * radius, height + 2 * radius, |x, y| {
        let src_x = x.saturating_sub(radius).min(width - 1);
        let src_y = y.saturating_sub(radius).min(height - 1);
        *image.get_pixel(src_x, src_y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_turns_white() {
        let image = GrayImage::from_pixel(20, 20, Luma([90]));
        let out = adaptive_mean_threshold(&image, 17, 3);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_dark_stroke_on_white_stays_dark() {
        let mut image = GrayImage::from_pixel(40, 40, Luma([255]));
        for y in 5..35 {
            image.put_pixel(20, y, Luma([0]));
        }

        let out = adaptive_mean_threshold(&image, 17, 3);
        for y in 5..35 {
            assert_eq!(out.get_pixel(20, y)[0], 0);
        }
        assert_eq!(out.get_pixel(10, 20)[0], 255);
        assert_eq!(out.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_output_is_binary() {
        let image = GrayImage::from_fn(33, 21, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let out = adaptive_mean_threshold(&image, 17, 3);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_block_larger_than_image() {
        let mut image = GrayImage::from_pixel(3, 3, Luma([250]));
        image.put_pixel(1, 1, Luma([10]));
        let out = adaptive_mean_threshold(&image, 17, 3);
        assert_eq!(out.get_pixel(1, 1)[0], 0);
        assert_eq!(out.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_edge_columns_use_repeated_border() {
        // A clipped window would average 2 columns of 116 with 7 of 120 and
        // mark (0, 20) black. Repeating column 0 gives 10 of 116 and 7 of 120.
        let image = GrayImage::from_fn(60, 40, |x, _| if x < 2 { Luma([116]) } else { Luma([120]) });
        let out = adaptive_mean_threshold(&image, 17, 3);
        assert_eq!(out.get_pixel(0, 20)[0], 255);
        assert_eq!(out.get_pixel(1, 20)[0], 255);
        assert_eq!(out.get_pixel(30, 20)[0], 255);
    }

    #[test]
    fn test_replicate_border_repeats_edges() {
        let image = GrayImage::from_fn(2, 2, |x, y| Luma([(10 * (y * 2 + x) + 10) as u8]));
        let padded = replicate_border(&image, 2);
        assert_eq!(padded.dimensions(), (6, 6));
        assert_eq!(padded.get_pixel(0, 0)[0], 10);
        assert_eq!(padded.get_pixel(5, 0)[0], 20);
        assert_eq!(padded.get_pixel(0, 5)[0], 30);
        assert_eq!(padded.get_pixel(5, 5)[0], 40);
        assert_eq!(padded.get_pixel(3, 3)[0], 40);
    }

    #[test]
    fn test_empty_image() {
        let out = adaptive_mean_threshold(&GrayImage::new(0, 0), 17, 3);
        assert_eq!(out.dimensions(), (0, 0));
    }
}
