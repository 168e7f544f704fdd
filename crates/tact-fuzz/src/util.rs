//! Randomness and naming helpers.

use rand::seq::SliceRandom;
use rand::Rng;
use tact_compiler::ast::NumberBase;

/// Words that can never be used as generated identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "bounced", "catch", "const", "contract", "do", "else", "emptyMap",
    "extend", "extends", "external", "false", "foreach", "fun", "get", "if", "import", "in",
    "init", "initOf", "inline", "let", "map", "message", "mutates", "native", "null",
    "override", "primitive", "public", "receive", "repeat", "require", "return", "self",
    "sender", "struct", "trait", "true", "try", "until", "virtual", "while", "with",
    // Stdlib type names.
    "Int", "Bool", "Builder", "Slice", "Cell", "Address", "String", "StringBuilder",
];

const MIN_NAME_LEN: usize = 3;
const MAX_NAME_LEN: usize = 8;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Largest magnitude of generated integer literals.
pub const MAX_LITERAL: u64 = u16::MAX as u64;

/// Pick an element uniformly at random; every index is reachable.
pub fn random_element<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Pick a value by weight. Entries with weight 0 are never chosen.
pub fn weighted_choice<T: Copy, R: Rng>(rng: &mut R, items: &[(T, u32)]) -> Option<T> {
    items.choose_weighted(rng, |(_, w)| *w).ok().map(|(v, _)| *v)
}

/// A random lowercase identifier, capitalized for type names. Generated names
/// never contain `_`, which keeps them apart from canonical renamer output.
pub fn random_name<R: Rng>(rng: &mut R, capitalized: bool) -> String {
    let len = rng.gen_range(MIN_NAME_LEN..=MAX_NAME_LEN);
    let mut name: String = (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect();
    if capitalized {
        name[..1].make_ascii_uppercase();
    }
    name
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// A short printable string literal body.
pub fn random_string<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(0..=MAX_NAME_LEN);
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.15) {
                ' '
            } else {
                LETTERS[rng.gen_range(0..LETTERS.len())] as char
            }
        })
        .collect()
}

pub fn random_number<R: Rng>(rng: &mut R) -> (NumberBase, u64) {
    let base = random_element(
        rng,
        &[NumberBase::Bin, NumberBase::Oct, NumberBase::Dec, NumberBase::Hex],
    )
    .copied()
    .unwrap_or(NumberBase::Dec);
    (base, rng.gen_range(0..=MAX_LITERAL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_element_reaches_every_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let items = [0usize, 1, 2, 3];
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[*random_element(&mut rng, &items).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert!(random_element::<usize, _>(&mut rng, &[]).is_none());
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            assert_eq!(weighted_choice(&mut rng, &[('a', 0), ('b', 3)]), Some('b'));
        }
        assert_eq!(weighted_choice::<char, _>(&mut rng, &[]), None);
    }

    #[test]
    fn names() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let name = random_name(&mut rng, true);
            assert!(name.len() >= MIN_NAME_LEN && name.len() <= MAX_NAME_LEN);
            assert!(name.chars().next().unwrap().is_ascii_uppercase());
            assert!(!name.contains('_'));
        }
        assert!(is_reserved("self"));
        assert!(!is_reserved("counter"));
    }
}
