use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::CableColor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cable {
    pub color: CableColor,
    /// Position of the color in the palette before shuffling.
    pub original_index: usize,
}

/// The two banks of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableAssignment {
    pub left: Vec<Cable>,
    pub right: Vec<Cable>,
}

impl CableAssignment {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Whether left slot `from` and right slot `to` carry the same color.
    /// Out-of-range indices never match.
    pub fn colors_match(&self, from: usize, to: usize) -> bool {
        match (self.left.get(from), self.right.get(to)) {
            (Some(left), Some(right)) => left.color == right.color,
            _ => false,
        }
    }

    /// Right slot holding the color of left slot `from`.
    pub fn partner_of(&self, from: usize) -> Option<usize> {
        let color = &self.left.get(from)?.color;
        self.right.iter().position(|cable| &cable.color == color)
    }
}

/// Fisher–Yates shuffle into a new vector; `items` is left untouched.
pub fn shuffle<T: Clone>(items: &[T], rng: &mut impl Rng) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Takes the first `count` palette colors and shuffles them independently
/// into a left and a right bank.
pub fn generate_cables(palette: &[CableColor], count: usize, rng: &mut impl Rng) -> CableAssignment {
    let cables: Vec<Cable> = palette
        .iter()
        .take(count)
        .enumerate()
        .map(|(original_index, color)| Cable {
            color: color.clone(),
            original_index,
        })
        .collect();
    let left = shuffle(&cables, rng);
    let right = shuffle(&cables, rng);
    CableAssignment { left, right }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_PALETTE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_is_a_permutation_and_leaves_input_alone() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<u32> = (0..20).collect();
        let shuffled = shuffle(&input, &mut rng);
        assert_eq!(input, (0..20).collect::<Vec<_>>());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, input);
    }

    #[test]
    fn shuffle_handles_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle::<u8>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&[5u8], &mut rng), vec![5]);
    }

    #[test]
    fn shuffle_reaches_every_position() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut first_seen = [false; 4];
        for _ in 0..200 {
            let shuffled = shuffle(&[0usize, 1, 2, 3], &mut rng);
            first_seen[shuffled[0]] = true;
        }
        assert!(first_seen.iter().all(|seen| *seen));
    }

    #[test]
    fn banks_hold_the_first_colors_of_the_palette() {
        let mut rng = StdRng::seed_from_u64(3);
        for count in 3..=DEFAULT_PALETTE.len() {
            let assignment = generate_cables(&DEFAULT_PALETTE, count, &mut rng);
            for bank in [&assignment.left, &assignment.right] {
                assert_eq!(bank.len(), count);
                let mut indices: Vec<usize> = bank.iter().map(|c| c.original_index).collect();
                indices.sort_unstable();
                assert_eq!(indices, (0..count).collect::<Vec<_>>());
                for cable in bank {
                    assert_eq!(cable.color, DEFAULT_PALETTE[cable.original_index]);
                }
            }
        }
    }

    #[test]
    fn partner_lookup_agrees_with_color_match() {
        let mut rng = StdRng::seed_from_u64(11);
        let assignment = generate_cables(&DEFAULT_PALETTE, 6, &mut rng);
        for from in 0..6 {
            let to = assignment.partner_of(from).unwrap();
            assert!(assignment.colors_match(from, to));
        }
        assert!(!assignment.colors_match(6, 0));
        assert!(!assignment.colors_match(0, 6));
        assert_eq!(assignment.partner_of(6), None);
    }
}
