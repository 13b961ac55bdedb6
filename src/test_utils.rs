//! Test utilities for imageops-smartcrop
//!
//! Image builders shared by the unit tests. Only compiled for tests.

use image::Rgba;

use crate::Image;

/// Creates a 2x2 RGBA image with known pixel values:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates an image filled with one color.
pub fn create_uniform_rgba_image(width: u32, height: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates an opaque image of pseudo-random colors.
///
/// The same seed always yields the same image.
pub fn create_noise_rgba_image(width: u32, height: u32, seed: u64) -> Image<Rgba<u8>> {
    // splitmix64
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    };

    Image::from_fn(width, height, |_, _| {
        let [r, g, b, ..] = next().to_le_bytes();
        Rgba([r, g, b, 255])
    })
}

/// Creates an opaque dark image with a bright `size x size` square at `(x, y)`.
///
/// Parts of the square outside the image are dropped.
pub fn create_bright_square_image(
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    size: u32,
) -> Image<Rgba<u8>> {
    Image::from_fn(width, height, |px, py| {
        if (x..x + size).contains(&px) && (y..y + size).contains(&py) {
            Rgba([240, 240, 240, 255])
        } else {
            Rgba([16, 16, 16, 255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn noise_is_deterministic_and_opaque() {
        let first = create_noise_rgba_image(16, 16, 42);
        let second = create_noise_rgba_image(16, 16, 42);
        let other = create_noise_rgba_image(16, 16, 43);

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn bright_square_covers_only_its_area() {
        let image = create_bright_square_image(20, 20, 5, 6, 4);
        assert_eq!(image.get_pixel(5, 6), &Rgba([240, 240, 240, 255]));
        assert_eq!(image.get_pixel(8, 9), &Rgba([240, 240, 240, 255]));
        assert_eq!(image.get_pixel(9, 9), &Rgba([16, 16, 16, 255]));
        assert_eq!(image.get_pixel(4, 6), &Rgba([16, 16, 16, 255]));
    }
}
