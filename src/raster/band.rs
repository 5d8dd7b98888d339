//! In-memory raster band

use crate::coordinate::PixelWindow;

/// One band of samples in row-major order
///
/// Samples are held as `f64` whatever the file's data type, so filtering
/// and averaging never overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl Band {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Band { width, height, data }
    }

    /// Band with every sample set to `value`
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Band { width, height, data: vec![value; width * height] }
    }

    pub fn get(&self, column: usize, row: usize) -> f64 {
        self.data[row * self.width + column]
    }

    pub fn set(&mut self, column: usize, row: usize, value: f64) {
        self.data[row * self.width + column] = value;
    }

    /// Copy the `source_window` of `source` into this band at `target_window`
    ///
    /// The copied block is the smaller of the two windows along each axis.
    pub fn paste(&mut self, source: &Band, source_window: &PixelWindow, target_window: &PixelWindow) {
        let (columns, rows) = source_window.common_size(target_window);
        let columns = columns
            .min(source.width.saturating_sub(source_window.x_off))
            .min(self.width.saturating_sub(target_window.x_off));
        let rows = rows
            .min(source.height.saturating_sub(source_window.y_off))
            .min(self.height.saturating_sub(target_window.y_off));

        for row in 0..rows {
            let source_start = (source_window.y_off + row) * source.width + source_window.x_off;
            let target_start = (target_window.y_off + row) * self.width + target_window.x_off;
            self.data[target_start..target_start + columns]
                .copy_from_slice(&source.data[source_start..source_start + columns]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_copies_the_common_block() {
        let source = Band::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut target = Band::filled(4, 4, -999.0);

        let source_window = PixelWindow { x_off: 1, y_off: 0, x_size: 2, y_size: 2 };
        let target_window = PixelWindow { x_off: 2, y_off: 1, x_size: 2, y_size: 3 };
        target.paste(&source, &source_window, &target_window);

        assert_eq!(target.get(2, 1), 2.0);
        assert_eq!(target.get(3, 1), 3.0);
        assert_eq!(target.get(2, 2), 5.0);
        assert_eq!(target.get(3, 2), 6.0);
        assert_eq!(target.get(2, 3), -999.0);
        assert_eq!(target.data.iter().filter(|v| **v == -999.0).count(), 12);
    }
}
