use image::Rgba;

/// Side of one checkerboard square, in output pixels.
pub const CHECKER_SIZE: u32 = 25;

pub const CHECKER_DARK: Rgba<u8> = Rgba([58, 58, 58, 255]);
pub const CHECKER_LIGHT: Rgba<u8> = Rgba([84, 84, 84, 255]);

/// Checkerboard shown where there is no image. Keyed on output
/// coordinates only, so it stays put while panning.
pub fn checker_at(x: u32, y: u32) -> Rgba<u8> {
    if (x / CHECKER_SIZE) % 2 == (y / CHECKER_SIZE) % 2 {
        CHECKER_DARK
    } else {
        CHECKER_LIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_blocks() {
        assert_eq!(checker_at(0, 0), CHECKER_DARK);
        assert_eq!(checker_at(24, 24), CHECKER_DARK);
        assert_eq!(checker_at(25, 0), CHECKER_LIGHT);
        assert_eq!(checker_at(0, 25), CHECKER_LIGHT);
        assert_eq!(checker_at(25, 25), CHECKER_DARK);
    }

    #[test]
    fn test_checker_repeats_every_two_blocks() {
        for (x, y) in [(3, 7), (130, 260), (999, 1)] {
            let here = checker_at(x, y);
            assert_eq!(checker_at(x + 2 * CHECKER_SIZE, y), here);
            assert_eq!(checker_at(x, y + 2 * CHECKER_SIZE), here);
            assert_ne!(checker_at(x + CHECKER_SIZE, y), here);
        }
    }
}
