pub fn multiply_vectors_in_place(a: &mut [f32], b: &[f32]) {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x *= *y;
    }
}

/// Arithmetic mean, zero for an empty slice.
#[inline]
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[inline]
pub fn bin_to_freq(bin: usize, fft_size: usize, sample_rate: f32) -> f32 {
    bin as f32 * sample_rate / fft_size as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_vectors_in_place_test() {
        let expected = vec![1.0, 4.0, 6.0, 50.0];
        let mut a = vec![1.0, 2.0, 3.0, 5.0];
        let b = vec![1.0, 2.0, 2.0, 10.0];

        multiply_vectors_in_place(&mut a, &b);

        assert_eq!(expected, a);
    }

    #[test]
    fn mean_test() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
    }

    #[test]
    fn bin_to_freq_test() {
        assert_eq!(bin_to_freq(0, 4096, 48000.0), 0.0);
        assert_eq!(bin_to_freq(2048, 4096, 48000.0), 24000.0);
    }
}
