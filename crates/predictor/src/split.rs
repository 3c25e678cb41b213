//! Deterministic train / validation split.

use data_loader::RatingTriple;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Shuffle `ratings` with `seed` and hold out `fraction` of them.
///
/// The validation size is `floor(len * fraction)`, capped so at least one
/// rating stays in the training partition. Same input and seed always give
/// the same split.
pub fn train_validation_split(
    ratings: &[RatingTriple],
    fraction: f32,
    seed: u64,
) -> (Vec<RatingTriple>, Vec<RatingTriple>) {
    let mut shuffled = ratings.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let held_out = ((ratings.len() as f64) * fraction.clamp(0.0, 1.0) as f64).floor() as usize;
    let held_out = held_out.min(ratings.len().saturating_sub(1));

    let validation = shuffled.split_off(shuffled.len() - held_out);
    (shuffled, validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(n: u32) -> Vec<RatingTriple> {
        (0..n).map(|i| RatingTriple::new(i, i, 3.0)).collect()
    }

    #[test]
    fn test_split_sizes() {
        let (train, validation) = train_validation_split(&ratings(10), 0.2, 7);
        assert_eq!(train.len(), 8);
        assert_eq!(validation.len(), 2);
    }

    #[test]
    fn test_split_is_a_partition() {
        let all = ratings(25);
        let (train, validation) = train_validation_split(&all, 0.3, 1);

        let mut ids: Vec<u32> = train.iter().chain(&validation).map(|r| r.user_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_deterministic() {
        let all = ratings(50);
        assert_eq!(
            train_validation_split(&all, 0.2, 42),
            train_validation_split(&all, 0.2, 42)
        );
    }

    #[test]
    fn test_split_keeps_one_training_rating() {
        let (train, validation) = train_validation_split(&ratings(1), 1.0, 3);
        assert_eq!(train.len(), 1);
        assert!(validation.is_empty());

        let (train, validation) = train_validation_split(&ratings(4), 0.0, 3);
        assert_eq!(train.len(), 4);
        assert!(validation.is_empty());
    }

    #[test]
    fn test_split_empty_input() {
        let (train, validation) = train_validation_split(&[], 0.2, 3);
        assert!(train.is_empty() && validation.is_empty());
    }
}
