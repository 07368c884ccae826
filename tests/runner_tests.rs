#![allow(missing_docs)]

use std::time::Duration;

use aptus::simulation::config::SimulationConfig;
use aptus::simulation::error::SimulationError;
use aptus::simulation::organism::Organism;
use aptus::simulation::position::Position;
use aptus::simulation::propulsion::Direction;
use aptus::simulation::runner::{FRAME_DELAY, RunState, Simulation};

fn create_test_config() -> SimulationConfig {
    SimulationConfig {
        world_width: 60,
        world_height: 60,
        border_thickness: 0,
        mutation_allowed: true,
        food_value: 1.0,
        food_expiry_seconds: 600,
        food_rate: 3,
        ticks_per_food_drop: 10,
        initial_organisms: 5,
        initial_food: 10,
        collision_detection: true,
        seed: Some(21),
        max_boundary_retries: 8,
    }
}

fn create_simulation() -> Simulation {
    Simulation::new(create_test_config()).expect("valid config")
}

fn insert_starving(simulation: &mut Simulation) {
    let env = simulation.environment_mut();
    let organism =
        Organism::seed(env.context(), Position::new(30, 30), Direction::None, 0).with_energy(0.0005);
    env.insert_organism(organism);
}

#[test]
fn test_new_simulation_is_reset() {
    let simulation = create_simulation();

    assert_eq!(simulation.state(), RunState::Reset);
    assert_eq!(simulation.census().organisms, 0);
    assert!(!simulation.food_drop_active());
    assert!(simulation.ancestry().is_none());
}

#[test]
fn test_start_populates_and_runs() {
    let mut simulation = create_simulation();
    simulation.start().expect("start from reset");

    assert_eq!(simulation.state(), RunState::Running);
    assert_eq!(simulation.census().organisms, 5);
    assert!(simulation.food_drop_active());

    assert_eq!(simulation.tick().expect("tick"), RunState::Running);
    assert_eq!(simulation.census().tick, 1);

    simulation.reset();
}

#[test]
fn test_pause_and_resume() {
    let mut simulation = create_simulation();
    simulation.start().expect("start");

    simulation.pause().expect("pause while running");
    assert_eq!(simulation.state(), RunState::Paused);
    assert!(!simulation.food_drop_active());

    assert_eq!(simulation.tick().expect("tick"), RunState::Paused);
    assert_eq!(simulation.census().tick, 0);

    simulation.resume().expect("resume while paused");
    assert_eq!(simulation.state(), RunState::Running);
    assert!(simulation.food_drop_active());

    simulation.reset();
}

#[test]
fn test_fast_forward_toggles() {
    let mut simulation = create_simulation();
    simulation.start().expect("start");

    simulation.toggle_fast_forward().expect("fast forward");
    assert_eq!(simulation.state(), RunState::FastForward);
    assert_eq!(simulation.state().frame_delay(), Duration::ZERO);
    assert_eq!(simulation.tick().expect("tick"), RunState::FastForward);

    simulation.pause().expect("pause while fast forwarding");
    assert_eq!(simulation.state(), RunState::Paused);
    simulation.resume().expect("resume");
    assert_eq!(simulation.state(), RunState::FastForward);

    simulation.toggle_fast_forward().expect("back to normal");
    assert_eq!(simulation.state(), RunState::Running);
    assert_eq!(simulation.state().frame_delay(), FRAME_DELAY);

    simulation.pause().expect("pause while running");
    simulation.resume().expect("resume");
    assert_eq!(simulation.state(), RunState::Running);

    simulation.reset();
}

#[test]
fn test_invalid_transitions_are_rejected() {
    let mut simulation = create_simulation();

    assert!(matches!(
        simulation.pause(),
        Err(SimulationError::InvalidTransition {
            from: RunState::Reset,
            action: "pause"
        })
    ));
    assert!(simulation.resume().is_err());
    assert!(simulation.toggle_fast_forward().is_err());

    simulation.start().expect("start");
    assert!(matches!(
        simulation.start(),
        Err(SimulationError::InvalidTransition {
            from: RunState::Running,
            ..
        })
    ));
    assert!(simulation.resume().is_err());

    simulation.pause().expect("pause");
    assert!(simulation.toggle_fast_forward().is_err());
    assert!(simulation.pause().is_err());

    simulation.reset();
}

#[test]
fn test_subscribers_see_every_transition() {
    let mut simulation = create_simulation();
    let rx = simulation.subscribe();

    simulation.start().expect("start");
    simulation.pause().expect("pause");
    simulation.resume().expect("resume");
    simulation.toggle_fast_forward().expect("fast forward");
    simulation.reset();

    let seen: Vec<RunState> = rx.try_iter().collect();
    assert_eq!(
        seen,
        vec![
            RunState::Running,
            RunState::Paused,
            RunState::Running,
            RunState::FastForward,
            RunState::Reset,
        ]
    );
}

#[test]
fn test_extinction_keeps_ancestry_until_reset() {
    let mut config = create_test_config();
    config.initial_organisms = 0;
    let mut simulation = Simulation::new(config).expect("valid config");
    let rx = simulation.subscribe();

    simulation.start().expect("start");
    insert_starving(&mut simulation);

    assert_eq!(simulation.tick().expect("tick"), RunState::Extinct);
    assert!(!simulation.food_drop_active());

    let history = simulation.ancestry().expect("extinct world has ancestry");
    assert_eq!(history.len(), 1);
    assert_eq!(history.records()[0].genome_prefix, "c");

    // ticking an extinct world does nothing
    assert_eq!(simulation.tick().expect("tick"), RunState::Extinct);
    assert_eq!(simulation.census().tick, 1);

    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![RunState::Running, RunState::Extinct]
    );

    simulation.start().expect("restart after extinction");
    assert_eq!(simulation.state(), RunState::Running);
    assert!(simulation.ancestry().is_none());
    assert_eq!(simulation.census().tick, 0);

    simulation.reset();
}

#[test]
fn test_run_for_stops_at_extinction() {
    let mut config = create_test_config();
    config.initial_organisms = 0;
    let mut simulation = Simulation::new(config).expect("valid config");
    simulation.start().expect("start");
    insert_starving(&mut simulation);

    let ran = simulation.run_for(100).expect("run");

    assert_eq!(ran, 1);
    assert_eq!(simulation.state(), RunState::Extinct);
    simulation.reset();
}

#[test]
fn test_failed_tick_halts_the_simulation() {
    let mut config = create_test_config();
    config.initial_organisms = 0;
    let mut simulation = Simulation::new(config).expect("valid config");
    let rx = simulation.subscribe();
    simulation.start().expect("start");
    let env = simulation.environment_mut();
    let stuck = Organism::seed(env.context(), Position::new(0, 10), Direction::None, 0);
    env.insert_organism(stuck);

    assert!(matches!(
        simulation.tick(),
        Err(SimulationError::BoundaryDeadlock { .. })
    ));
    assert_eq!(simulation.state(), RunState::Halted);
    assert!(!simulation.food_drop_active());

    // a halted world refuses to tick
    assert_eq!(simulation.tick().expect("no tick"), RunState::Halted);
    assert_eq!(simulation.run_for(10).expect("no ticks"), 0);
    assert!(simulation.pause().is_err());
    assert!(simulation.resume().is_err());
    assert_eq!(simulation.census().tick, 0);

    simulation.start().expect("restart after halting");
    assert_eq!(simulation.state(), RunState::Running);
    assert_eq!(simulation.census().organisms, 0);

    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![
            RunState::Running,
            RunState::Halted,
            RunState::Reset,
            RunState::Running,
        ]
    );
    simulation.reset();
}

#[test]
fn test_run_state_names() {
    assert_eq!(RunState::FastForward.to_string(), "FASTFORWARD");
    assert_eq!(RunState::Extinct.to_string(), "EXTINCT");
    assert_eq!(RunState::Halted.to_string(), "HALTED");
    assert!(RunState::Running.is_ticking());
    assert!(RunState::FastForward.is_ticking());
    assert!(!RunState::Paused.is_ticking());
    assert!(!RunState::Halted.is_ticking());
}
