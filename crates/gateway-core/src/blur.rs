//! CPU-side blur detection for the quality pipeline's Laplacian branch.
//! `image` is the only decode crate in the dependency pack (sourced from
//! the document-processing side of it); there is no OpenCV binding
//! available, so the 3x3 Laplacian convolution is hand-rolled here.

use image::{imageops::FilterType, GenericImageView};

const LAPLACIAN_VARIANCE_THRESHOLD: f64 = 80.0;
const RESIZE_LONGER_SIDE: u32 = 300;

/// Decodes `bytes`, converts to grayscale, resizes so the longer side is
/// 300px, and returns whether the Laplacian-variance blur score falls
/// below the low-quality threshold.
pub fn is_blurry(bytes: &[u8]) -> anyhow::Result<bool> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = img.dimensions();
    let (new_w, new_h) = if w >= h {
        (RESIZE_LONGER_SIDE, (h as f32 * RESIZE_LONGER_SIDE as f32 / w as f32) as u32)
    } else {
        ((w as f32 * RESIZE_LONGER_SIDE as f32 / h as f32) as u32, RESIZE_LONGER_SIDE)
    };
    let resized = img.resize_exact(new_w.max(1), new_h.max(1), FilterType::Triangle);
    let gray = resized.to_luma8();

    let variance = laplacian_variance(&gray);
    Ok(variance < LAPLACIAN_VARIANCE_THRESHOLD)
}

fn laplacian_variance(gray: &image::GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return f64::MAX;
    }

    let mut responses = Vec::with_capacity(((w - 2) * (h - 2)) as usize);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = gray.get_pixel(x, y)[0] as f64;
            let up = gray.get_pixel(x, y - 1)[0] as f64;
            let down = gray.get_pixel(x, y + 1)[0] as f64;
            let left = gray.get_pixel(x - 1, y)[0] as f64;
            let right = gray.get_pixel(x + 1, y)[0] as f64;
            let laplacian = up + down + left + right - 4.0 * center;
            responses.push(laplacian);
        }
    }

    let mean = responses.iter().sum::<f64>() / responses.len() as f64;
    responses.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / responses.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn flat_image_has_zero_variance() {
        let img: image::GrayImage = ImageBuffer::from_pixel(10, 10, Luma([128u8]));
        assert_eq!(laplacian_variance(&img), 0.0);
    }

    #[test]
    fn checkerboard_has_high_variance() {
        let img = ImageBuffer::from_fn(10, 10, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });
        assert!(laplacian_variance(&img) > 80.0);
    }
}
