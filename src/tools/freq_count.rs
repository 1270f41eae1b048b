//! Byte frequency counting over a slice of u8 data.
//!
//! Returns an array of 256 u32 counts. Large slices are counted in parallel
//! chunks with rayon; 16k chunks are pretty much the sweet spot.

use rayon::prelude::*;

/// Returns a frequency count of the input data.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    if data.len() > 64_000 {
        data.par_chunks(16_000)
            .fold(
                || [0_u32; 256],
                |mut freqs: [u32; 256], chunk| {
                    chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                    freqs
                },
            )
            .reduce(
                || [0_u32; 256],
                |mut total, partial| {
                    for (t, p) in total.iter_mut().zip(&partial) {
                        *t += p;
                    }
                    total
                },
            )
    } else {
        let mut freqs = [0_u32; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        freqs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn small_input() {
        let counts = freqs(b"abracadabra");
        assert_eq!(counts[b'a' as usize], 5);
        assert_eq!(counts[b'b' as usize], 2);
        assert_eq!(counts[b'r' as usize], 2);
        assert_eq!(counts[b'c' as usize], 1);
        assert_eq!(counts[b'd' as usize], 1);
        assert_eq!(counts.iter().sum::<u32>(), 11);
    }

    #[test]
    fn parallel_path_matches_serial() {
        let data: Vec<u8> = (0..200_000_u32).map(|i| (i % 251) as u8).collect();
        let parallel = freqs(&data);
        let mut serial = [0_u32; 256];
        data.iter().for_each(|&el| serial[el as usize] += 1);
        assert_eq!(parallel, serial);
    }
}
