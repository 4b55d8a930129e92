use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Seeded source of integers for the carving algorithms.
///
/// Every seed, zero included, is taken literally so a run can always be replayed.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    pub fn new(seed: u64) -> Randomizer {
        Randomizer { rng: StdRng::seed_from_u64(seed) }
    }

    /// Uniform in `[low, high]`. An inverted range yields `low`.
    pub fn get_int(&mut self, low: usize, high: usize) -> usize {
        if low >= high {
            low
        } else {
            self.rng.gen_range(low..=high)
        }
    }

    /// Every integer in `[low, high]` in shuffled order, empty when `low > high`.
    pub fn get_num_ints_incl(&mut self, low: usize, high: usize) -> Vec<usize> {
        if low > high {
            return vec![];
        }
        let mut ints: Vec<usize> = (low..=high).collect();
        ints.shuffle(&mut self.rng);
        ints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn ints_stay_in_range() {
        let mut r = Randomizer::new(0);
        for _ in 0..1000 {
            let n = r.get_int(3, 7);
            assert!(n >= 3 && n <= 7);
        }
        assert_eq!(r.get_int(5, 5), 5);
        assert_eq!(r.get_int(9, 2), 9);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Randomizer::new(12345);
        let mut b = Randomizer::new(12345);
        let xs: Vec<usize> = (0..50).map(|_| a.get_int(0, 100)).collect();
        let ys: Vec<usize> = (0..50).map(|_| b.get_int(0, 100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn shuffled_ints_are_a_permutation() {
        let mut r = Randomizer::new(7);
        let ints = r.get_num_ints_incl(2, 9);
        assert_eq!(ints.into_iter().sorted().collect::<Vec<_>>(), (2..=9).collect::<Vec<_>>());
        assert!(r.get_num_ints_incl(4, 3).is_empty());
    }
}
