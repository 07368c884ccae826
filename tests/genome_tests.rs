#![allow(missing_docs)]

use aptus::simulation::context::{SharedRng, SimulationContext};
use aptus::simulation::error::GenomeError;
use aptus::simulation::genome::{
    Gene, Genome, clean, double, encode_body, halve, reverse, reverse_half, snip_and_replace,
    translate,
};
use aptus::simulation::geometric_utils::Bounds;
use aptus::simulation::position::Position;
use aptus::simulation::propulsion::Direction;
use proptest::prelude::*;

fn body(text: &str) -> Vec<Gene> {
    Genome::parse_body(text).expect("valid body")
}

fn is_well_formed(genes: &[Gene]) -> bool {
    genes.len() % 2 == 1
        && genes
            .iter()
            .enumerate()
            .all(|(i, g)| g.is_step() == (i % 2 == 1))
}

fn cells(genes: &[Gene]) -> usize {
    genes.iter().filter(|g| **g == Gene::Cell).count()
}

#[test]
fn test_genome_round_trip_through_text() {
    let genome: Genome = "c>cvc|1|2|RIGHT|-1".parse().expect("valid genome");

    assert_eq!(genome.body(), body("c>cvc").as_slice());
    assert_eq!(genome.meta().speed, 1);
    assert_eq!(genome.meta().mutation_chance_percent, 2);
    assert_eq!(genome.meta().propulsion, Direction::Right);
    assert_eq!(genome.meta().steps_before_direction_change, None);
    assert_eq!(genome.prefix(), "c>cvc");
    assert_eq!(genome.cell_count(), 3);
    assert_eq!(genome.to_string(), "c>cvc|1|2|RIGHT|-1");
}

#[test]
fn test_seed_genome_without_cadence_field() {
    let genome: Genome = "c|0|2|NONE".parse().expect("valid seed genome");

    assert_eq!(genome.meta().propulsion, Direction::None);
    assert_eq!(genome.to_string(), "c|0|2|NONE|-1");
    assert_eq!(Genome::seed(0, 2, Direction::None), genome);
}

#[test]
fn test_random_genome_keeps_cadence() {
    let genome: Genome = "c^c|2|1|RANDOM|137".parse().expect("valid genome");

    assert_eq!(genome.meta().steps_before_direction_change, Some(137));
    assert_eq!(genome.to_string(), "c^c|2|1|RANDOM|137");
}

#[test]
fn test_malformed_genomes_are_rejected() {
    assert_eq!(
        "cxc|1|2|RIGHT|-1".parse::<Genome>(),
        Err(GenomeError::UnknownSymbol {
            symbol: 'x',
            index: 1
        })
    );
    assert!(matches!(
        "c>c>|1|2|RIGHT|-1".parse::<Genome>(),
        Err(GenomeError::Misaligned(_))
    ));
    assert!(matches!(
        "cc|1|2|RIGHT|-1".parse::<Genome>(),
        Err(GenomeError::Misaligned(1))
    ));
    assert_eq!("c>c".parse::<Genome>(), Err(GenomeError::MissingMetadata));
    assert_eq!("|1|2|RIGHT|-1".parse::<Genome>(), Err(GenomeError::Empty));
    assert!(matches!(
        "c|fast|2|RIGHT".parse::<Genome>(),
        Err(GenomeError::BadField { field: "speed", .. })
    ));
    assert!(matches!(
        "c|1|2|SIDEWAYS".parse::<Genome>(),
        Err(GenomeError::BadField {
            field: "propulsion",
            ..
        })
    ));
}

#[test]
fn test_reverse_inverts_selected_axes() {
    let genes = body("c>c^c");

    assert_eq!(encode_body(&reverse(&genes, true, true)), "c<cvc");
    assert_eq!(encode_body(&reverse(&genes, true, false)), "c>cvc");
    assert_eq!(encode_body(&reverse(&genes, false, true)), "c<c^c");
    // neither axis selected means both
    assert_eq!(encode_body(&reverse(&genes, false, false)), "c<cvc");
}

#[test]
fn test_short_bodies_are_left_alone() {
    let rng = SharedRng::seeded(1);
    let single = body("c");
    let triple = body("c>c");

    assert_eq!(reverse(&single, true, true), single);
    assert_eq!(reverse(&triple, true, true), triple);
    assert_eq!(halve(&single, &rng), single);
    assert_eq!(halve(&triple, &rng), triple);
    assert_eq!(reverse_half(&triple, true, true, &rng), triple);
    assert_eq!(snip_and_replace(&triple, &rng), triple);
    assert_eq!(clean(&triple), triple);
}

#[test]
fn test_clean_drops_backtracking_steps() {
    assert_eq!(encode_body(&clean(&body("c>c<c^c"))), "c>c^c");
    assert_eq!(encode_body(&clean(&body("c>c<c<c"))), "c>c");
    assert_eq!(encode_body(&clean(&body("c^cvc^cvc"))), "c^c^c");
    assert_eq!(encode_body(&clean(&body("c>c^c<c"))), "c>c^c<c");
}

#[test]
fn test_halve_keeps_a_cell_aligned_half() {
    let genes = body("c>c^c<c");
    for seed in 0..20 {
        let halved = halve(&genes, &SharedRng::seeded(seed));
        let text = encode_body(&halved);
        assert!(text == "c>c" || text == "c<c", "unexpected half {text}");
    }
}

#[test]
fn test_double_concatenates_with_a_joiner() {
    let genes = body("c>c");
    for seed in 0..20 {
        let doubled = double(&genes, &SharedRng::seeded(seed));
        assert_eq!(doubled.len(), 7);
        assert_eq!(cells(&doubled), 4);
        assert!(is_well_formed(&doubled));
    }
}

#[test]
fn test_snip_and_replace_keeps_cells() {
    let genes = body("c>c^c<c");
    for seed in 0..20 {
        let snipped = snip_and_replace(&genes, &SharedRng::seeded(seed));
        assert_eq!(snipped.len(), 7);
        assert_eq!(cells(&snipped), 4);
        assert!(is_well_formed(&snipped));
    }
}

#[test]
fn test_reverse_half_rejoins_halves() {
    let genes = body("c>c^c");
    for seed in 0..20 {
        let reversed = reverse_half(&genes, true, true, &SharedRng::seeded(seed));
        assert_eq!(reversed.len(), 5);
        assert_eq!(cells(&reversed), 3);
        assert!(is_well_formed(&reversed));
    }
}

#[test]
fn test_mutation_produces_valid_genomes() {
    let ctx = SimulationContext::new(Some(42));
    let parent: Genome = "c>cvc^c<c|1|2|RIGHT|-1".parse().expect("valid genome");

    for _ in 0..200 {
        let child = parent
            .mutate(parent.meta().propulsion, ctx.rng())
            .expect("mutation keeps the body well formed");
        let meta = child.meta();

        assert!(is_well_formed(child.body()));
        assert!((0..3).contains(&meta.speed));
        assert!((1..3).contains(&meta.mutation_chance_percent));
        if let Some(steps) = meta.steps_before_direction_change {
            assert_eq!(meta.propulsion, Direction::Random);
            assert!((1..500).contains(&steps));
        }

        let reparsed: Genome = child.to_string().parse().expect("round trip");
        assert_eq!(reparsed, child);
    }
}

#[test]
fn test_translate_without_parent_starts_at_origin() {
    let shape = translate(&body("c>c>c"), None).expect("no pruning without parent");
    assert_eq!(
        shape,
        vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
    );

    let shape = translate(&body("cvc^c"), None).expect("no pruning without parent");
    assert_eq!(
        shape,
        vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 0)]
    );
}

#[test]
fn test_translate_is_idempotent() {
    let genes = body("c>c^c<cvc");
    let first = translate(&genes, None).expect("shape");
    let second = translate(&genes, None).expect("shape");
    assert_eq!(first, second);

    // placing next to a parent only shifts the shape
    let bounds = Bounds::from_world(50, 50, 0);
    let parent = [Position::new(20, 20)];
    let placed = translate(&genes, Some((&parent[..], &bounds))).expect("fits");
    let origin = placed[0];
    let relative: Vec<Position> = placed
        .iter()
        .map(|p| p.offset(-origin.x, -origin.y))
        .collect();
    assert_eq!(relative, first);
    assert_eq!(origin, Position::new(19, 19));
}

#[test]
fn test_translate_retries_on_the_other_side() {
    let bounds = Bounds::from_world(50, 50, 0);
    let parent = [Position::new(1, 1)];

    let placed = translate(&body("c>c>c"), Some((&parent[..], &bounds))).expect("fits after retry");
    assert_eq!(
        placed,
        vec![Position::new(3, 3), Position::new(4, 3), Position::new(5, 3)]
    );
}

#[test]
fn test_translate_reports_no_room() {
    let bounds = Bounds {
        width: 2,
        height: 2,
    };
    let parent = [Position::new(1, 1)];

    assert_eq!(
        translate(&body("c>c"), Some((&parent[..], &bounds))),
        Err(GenomeError::NoRoom { cells: 2 })
    );
}

fn step_from(index: u8) -> Gene {
    match index % 4 {
        0 => Gene::Left,
        1 => Gene::Right,
        2 => Gene::Up,
        _ => Gene::Down,
    }
}

prop_compose! {
    fn arb_body()(steps in prop::collection::vec(0u8..4, 0..24)) -> Vec<Gene> {
        let mut genes = vec![Gene::Cell];
        for step in steps {
            genes.push(step_from(step));
            genes.push(Gene::Cell);
        }
        genes
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_clean_never_backtracks(genes in arb_body()) {
        let cleaned = clean(&genes);

        prop_assert!(is_well_formed(&cleaned));
        if genes.len() > 3 {
            let steps: Vec<Gene> = cleaned.iter().copied().filter(|g| g.is_step()).collect();
            for pair in steps.windows(2) {
                prop_assert!(!pair[1].is_opposite_of(pair[0]), "{:?} follows {:?}", pair[1], pair[0]);
            }
        }
    }

    #[test]
    fn test_halve_returns_prefix_or_suffix(genes in arb_body(), seed in any::<u64>()) {
        let halved = halve(&genes, &SharedRng::seeded(seed));

        if genes.len() == 1 || genes.len() == 3 {
            prop_assert_eq!(&halved, &genes);
        } else {
            prop_assert!(is_well_formed(&halved));
            prop_assert!(genes.starts_with(&halved) || genes.ends_with(&halved));
            prop_assert!(halved.len() < genes.len());
        }
    }
}
