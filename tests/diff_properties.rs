// tests/diff_properties.rs
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use publish_notifier::diff::diff;
use publish_notifier::{KnownSet, PublishedItem};

fn random_case(rng: &mut StdRng) -> (Vec<PublishedItem>, KnownSet) {
    let universe = rng.random_range(1..40usize);
    let current: Vec<PublishedItem> = (0..rng.random_range(0..30usize))
        .map(|_| {
            let n = rng.random_range(0..universe);
            PublishedItem::new(format!("id-{n}"), format!("Title {n}"), format!("u/{n}"))
        })
        .collect();
    let known: KnownSet = (0..universe)
        .filter(|_| rng.random_bool(0.4))
        .map(|n| format!("id-{n}"))
        .collect();
    (current, known)
}

#[test]
fn diff_is_exactly_the_unknown_items_in_order() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let (current, known) = random_case(&mut rng);
        let out = diff(&current, &known);

        let expected: Vec<PublishedItem> = current
            .iter()
            .filter(|it| !known.contains(&it.identifier))
            .cloned()
            .collect();
        assert_eq!(out, expected);
        assert!(out.iter().all(|it| !known.contains(&it.identifier)));
    }
}

#[test]
fn diff_against_known_plus_result_is_empty() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let (current, mut known) = random_case(&mut rng);
        let fresh = diff(&current, &known);
        known.extend(fresh.iter().map(|it| it.identifier.clone()));
        assert!(diff(&current, &known).is_empty());
    }
}

#[test]
fn known_set_json_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (_, known) = random_case(&mut rng);
        let bytes = known.to_json().unwrap();
        let back = KnownSet::from_json(&bytes).unwrap();
        assert_eq!(back, known);
        assert_eq!(back.to_json().unwrap(), bytes);
    }
}
