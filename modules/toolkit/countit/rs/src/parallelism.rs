use eyre::Result;
use std::thread::available_parallelism;

fn normalize(requested: isize, max: usize) -> usize {
    let max = max as isize;
    let workers = match requested {
        0 => 1,
        // Negative values count back from the machine maximum: -1 is all cores, -2 all but one
        x if x < 0 => (max + x + 1).max(1),
        x => x.min(max),
    };
    workers as usize
}

/// Resolve a signed worker-count request against the available parallelism.
pub fn workers(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get();
    Ok(normalize(requested, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        for (requested, max, expected) in [
            (0, 4, 1),
            (1, 4, 1),
            (3, 4, 3),
            (4, 4, 4),
            (100, 4, 4),
            (-1, 4, 4),
            (-2, 4, 3),
            (-4, 4, 1),
            (-100, 4, 1),
        ] {
            assert_eq!(normalize(requested, max), expected);
        }
    }
}
