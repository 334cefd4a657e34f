//! Fixed-size window splitting for pipeline input.
//!
//! Both pipeline stages split their input into bounded, non-overlapping
//! windows sized for one model call: the audio path counts samples, the
//! text path counts words. The splitter is generic over the element type
//! so both share one implementation.

use crate::error::{OppsumError, Result};

/// One contiguous slice of input elements, sized for a single model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a, T> {
    /// Zero-based position of this window in the sequence of windows.
    pub index: usize,
    /// Offset of the first element within the original input.
    pub start: usize,
    /// The elements covered by this window.
    pub elements: &'a [T],
}

impl<'a, T> Window<'a, T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Iterator over the fixed-size windows of a slice.
///
/// Created by [`windows_of`]. Yields windows in input order; every element
/// belongs to exactly one window and only the final window may be short.
pub struct Windows<'a, T> {
    elements: &'a [T],
    size: usize,
    offset: usize,
    index: usize,
}

impl<'a, T> Iterator for Windows<'a, T> {
    type Item = Window<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.elements.len() {
            return None;
        }

        let end = (self.offset + self.size).min(self.elements.len());
        let window = Window {
            index: self.index,
            start: self.offset,
            elements: &self.elements[self.offset..end],
        };

        self.offset = end;
        self.index += 1;

        Some(window)
    }
}

/// Split a sequence into contiguous windows of at most `size` elements.
///
/// A sequence of length N yields ceil(N / size) windows; an empty sequence
/// yields none. Splitting is a pure function of the input and the size, so
/// re-running it over the same input produces identical windows.
pub fn windows_of<T>(elements: &[T], size: usize) -> Result<Windows<'_, T>> {
    if size == 0 {
        return Err(OppsumError::Config(
            "window size must be a positive number of elements".to_string(),
        ));
    }

    Ok(Windows {
        elements,
        size,
        offset: 0,
        index: 0,
    })
}

/// Number of windows a sequence of `len` elements splits into.
///
/// `size` must be positive; validate through [`windows_of`] first.
pub fn window_count(len: usize, size: usize) -> usize {
    len.div_ceil(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_windows(elements: &[u8], size: usize) -> Vec<Vec<u8>> {
        windows_of(elements, size)
            .unwrap()
            .map(|w| w.elements.to_vec())
            .collect()
    }

    #[test]
    fn test_exact_multiple_produces_full_windows() {
        let input: Vec<u8> = (0..12).collect();
        let windows = collect_windows(&input, 4);

        assert_eq!(windows.len(), 3);
        assert!(windows.iter().all(|w| w.len() == 4));
    }

    #[test]
    fn test_remainder_goes_into_short_final_window() {
        let input: Vec<u8> = (0..10).collect();
        let windows = collect_windows(&input, 4);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].len(), 4);
        assert_eq!(windows[1].len(), 4);
        assert_eq!(windows[2].len(), 2);
    }

    #[test]
    fn test_windows_cover_input_exactly_once() {
        let input: Vec<u8> = (0..23).collect();
        let windows = collect_windows(&input, 5);

        let rejoined: Vec<u8> = windows.into_iter().flatten().collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn test_window_offsets_and_indexes_are_contiguous() {
        let input: Vec<u8> = (0..23).collect();
        let windows: Vec<_> = windows_of(&input, 5).unwrap().collect();

        let mut expected_start = 0;
        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.index, i);
            assert_eq!(window.start, expected_start);
            expected_start += window.len();
        }
        assert_eq!(expected_start, input.len());
    }

    #[test]
    fn test_count_matches_ceiling_division() {
        for len in [0usize, 1, 7, 49, 50, 51, 100, 2000] {
            for size in [1usize, 3, 50, 900] {
                let input = vec![0u8; len];
                let produced = windows_of(&input, size).unwrap().count();
                assert_eq!(produced, window_count(len, size), "len={} size={}", len, size);
            }
        }
    }

    #[test]
    fn test_empty_input_yields_no_windows() {
        let input: Vec<u8> = Vec::new();
        assert_eq!(collect_windows(&input, 10).len(), 0);
    }

    #[test]
    fn test_input_shorter_than_window_yields_single_window() {
        let input: Vec<u8> = (0..3).collect();
        let windows = collect_windows(&input, 900);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 3);
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        let input = [1u8, 2, 3];
        let result = windows_of(&input, 0);

        assert!(matches!(result, Err(OppsumError::Config(_))));
    }

    #[test]
    fn test_word_windows_match_long_lecture_shape() {
        // 2000 words at 900 per window: 900, 900, 200.
        let words: Vec<String> = (0..2000).map(|i| format!("w{}", i)).collect();
        let windows: Vec<_> = windows_of(&words, 900).unwrap().collect();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].len(), 900);
        assert_eq!(windows[1].len(), 900);
        assert_eq!(windows[2].len(), 200);
        assert_eq!(windows[2].start, 1800);
    }

    #[test]
    fn test_splitting_is_deterministic() {
        let input: Vec<u8> = (0..100).collect();
        let first = collect_windows(&input, 7);
        let second = collect_windows(&input, 7);

        assert_eq!(first, second);
    }
}
