//! Constrained Random Sampling
//!
//! Shared selection helpers used by every variant that draws stimuli:
//! sequences with no two adjacent elements equal, picks that skip a
//! predicate, and draws of distinct elements.

use super::rng::DeterministicRng;

/// Pick a random element for which `exclude` returns false.
pub fn choose_excluding<'a, T, F>(
    rng: &mut DeterministicRng,
    items: &'a [T],
    exclude: F,
) -> Option<&'a T>
where
    F: Fn(&T) -> bool,
{
    let candidates: Vec<&T> = items.iter().filter(|item| !exclude(*item)).collect();
    rng.choose(&candidates).copied()
}

/// Draw `len` elements from `alphabet` such that no two neighbors are equal.
///
/// The result is shorter than `len` only when the alphabet has no element
/// different from the previous pick (a single-symbol alphabet).
pub fn sequence_without_adjacent_repeats<T>(
    rng: &mut DeterministicRng,
    alphabet: &[T],
    len: usize,
) -> Vec<T>
where
    T: Clone + PartialEq,
{
    let mut sequence: Vec<T> = Vec::with_capacity(len);

    for _ in 0..len {
        let previous = sequence.last().cloned();
        let next = choose_excluding(rng, alphabet, |item| Some(item) == previous.as_ref());
        match next {
            Some(item) => sequence.push(item.clone()),
            None => break,
        }
    }

    sequence
}

/// Draw up to `count` elements at distinct positions of `items`.
///
/// Uses a partial Fisher-Yates shuffle over indices.
pub fn sample_distinct<T: Clone>(rng: &mut DeterministicRng, items: &[T], count: usize) -> Vec<T> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    let take = count.min(indices.len());

    for i in 0..take {
        let j = i + rng.next_index(indices.len() - i);
        indices.swap(i, j);
    }

    indices[..take].iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_choose_excluding_never_returns_excluded() {
        let mut rng = DeterministicRng::new(7);
        let items = [1, 2, 3, 4];

        for _ in 0..200 {
            let pick = choose_excluding(&mut rng, &items, |v| *v % 2 == 0);
            assert!(matches!(pick, Some(1) | Some(3)));
        }

        assert!(choose_excluding(&mut rng, &items, |_| true).is_none());
    }

    #[test]
    fn test_single_symbol_alphabet_stops_early() {
        let mut rng = DeterministicRng::new(1);
        let seq = sequence_without_adjacent_repeats(&mut rng, &['x'], 4);
        assert_eq!(seq, vec!['x']);
    }

    #[test]
    fn test_sample_distinct_caps_at_len() {
        let mut rng = DeterministicRng::new(11);
        let picked = sample_distinct(&mut rng, &["a", "b"], 5);
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&"a") && picked.contains(&"b"));
    }

    proptest! {
        #[test]
        fn prop_no_adjacent_repeats(seed in any::<u64>(), len in 0usize..40) {
            let mut rng = DeterministicRng::new(seed);
            let alphabet: Vec<u32> = (1..=16).collect();
            let seq = sequence_without_adjacent_repeats(&mut rng, &alphabet, len);

            prop_assert_eq!(seq.len(), len);
            for pair in seq.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
            prop_assert!(seq.iter().all(|v| alphabet.contains(v)));
        }

        #[test]
        fn prop_sample_distinct_positions(seed in any::<u64>(), count in 0usize..12) {
            let mut rng = DeterministicRng::new(seed);
            let items: Vec<u32> = (0..8).collect();
            let mut picked = sample_distinct(&mut rng, &items, count);

            prop_assert_eq!(picked.len(), count.min(items.len()));
            picked.sort();
            picked.dedup();
            prop_assert_eq!(picked.len(), count.min(items.len()));
        }
    }
}
