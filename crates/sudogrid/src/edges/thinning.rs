//! One-pass morphological line thinning.

use crate::frame::Image;

// Thinning structuring elements from Digital Image Processing 3rd ed.,
// §9.5.5: 0 = must be background, 1 = must be edge, 2 = don't care.
// Order: top-left, top, top-right, left, center, right, bottom-left,
// bottom, bottom-right.
const MASKS: [[u8; 9]; 8] = [
    [0, 0, 0, 2, 1, 2, 1, 1, 1],
    [2, 0, 0, 1, 1, 0, 1, 1, 2],
    [1, 2, 0, 1, 1, 0, 1, 2, 0],
    [1, 1, 2, 1, 1, 0, 2, 0, 0],
    [1, 1, 1, 2, 1, 2, 0, 0, 0],
    [2, 1, 1, 0, 1, 1, 0, 0, 2],
    [0, 2, 1, 0, 1, 1, 0, 2, 1],
    [0, 0, 2, 0, 1, 1, 2, 1, 1],
];

/// Erase edge pixels whose 3×3 neighbourhood matches any thinning mask.
///
/// A single pass over the fixed mask set is enough after non-maximum
/// suppression; full thinning would iterate the masks to convergence.
/// All masks read the input image, so the pass is order-independent.
pub fn thin_lines(input: &Image, output: &mut Image) {
    output.match_size(input);
    output.data.copy_from_slice(&input.data);

    let width = input.width as usize;
    let height = input.height as usize;
    if width < 3 || height < 3 {
        return;
    }

    for mask in &MASKS {
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let index = (y * width + x) * 3;
                if input.data[index] != 255 {
                    continue;
                }

                let matches = |mask_index: usize, x: usize, y: usize| {
                    let value = input.data[(y * width + x) * 3];
                    match mask[mask_index] {
                        0 => value == 0,
                        1 => value == 255,
                        _ => true,
                    }
                };

                if matches(0, x - 1, y - 1)
                    && matches(1, x, y - 1)
                    && matches(2, x + 1, y - 1)
                    && matches(3, x - 1, y)
                    && matches(4, x, y)
                    && matches(5, x + 1, y)
                    && matches(6, x - 1, y + 1)
                    && matches(7, x, y + 1)
                    && matches(8, x + 1, y + 1)
                {
                    output.data[index] = 0;
                    output.data[index + 1] = 0;
                    output.data[index + 2] = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::uniform_image;

    fn count_edges(image: &Image) -> usize {
        (0..image.pixel_count())
            .filter(|&i| image.data[i * 3] == 255)
            .count()
    }

    #[test]
    fn single_pixel_line_is_preserved() {
        let mut input = uniform_image(9, 9, 0);
        for y in 1..8 {
            let index = input.index(4, y);
            input.data[index] = 255;
        }
        let before = count_edges(&input);
        let mut output = Image::default();
        thin_lines(&input, &mut output);
        assert_eq!(count_edges(&output), before);
    }

    #[test]
    fn filled_block_loses_its_skin() {
        let mut input = uniform_image(11, 11, 0);
        for y in 2..9 {
            for x in 2..9 {
                let index = input.index(x, y);
                input.data[index] = 255;
            }
        }
        let before = count_edges(&input);
        let mut output = Image::default();
        thin_lines(&input, &mut output);
        let after = count_edges(&output);
        assert!(after < before);
        // Interior pixels have no background neighbour and must survive.
        assert_eq!(output.data[output.index(5, 5)], 255);
    }
}
