use std::time::Duration;

use aptus::simulation::cell::{Cell, CellId};
use aptus::simulation::food::{Food, FoodId};
use aptus::simulation::geometric_utils::{Bounds, height_of, sweep_keys, width_of};
use aptus::simulation::locatable::Locatable;
use aptus::simulation::organism::OrganismId;
use aptus::simulation::position::Position;
use aptus::simulation::propulsion::{Direction, Propulsion};
use aptus::simulation::spatial::OccupancyIndex;

fn cell(id: u64, x: i32, y: i32) -> Cell {
    Cell::new(CellId(id), Position::new(x, y), Propulsion::new(Direction::None))
}

#[test]
fn test_cell_locatable() {
    let mut cell = cell(0, 3, 4);

    // Test position accessor
    assert_eq!(cell.position(), Position::new(3, 4));

    // Shifts remember the previous coordinate per axis
    cell.shift_x(2);
    assert_eq!(cell.position(), Position::new(5, 4));
    assert_eq!(cell.prev_position, Position::new(3, 4));
    cell.shift_y(-1);
    assert_eq!(cell.position(), Position::new(5, 3));
    assert_eq!(cell.prev_position, Position::new(3, 4));
}

#[test]
fn test_food_locatable() {
    let food = Food::new(FoodId(1), Position::new(7, 8), 1.0, Duration::from_secs(1));
    assert_eq!(food.position(), Position::new(7, 8));
}

#[test]
fn test_locatable_trait_polymorphism() {
    let items: Vec<Box<dyn Locatable>> = vec![
        Box::new(cell(0, 1, 1)),
        Box::new(Food::new(FoodId(0), Position::new(2, 2), 1.0, Duration::from_secs(1))),
    ];

    let positions: Vec<Position> = items.iter().map(|item| item.position()).collect();
    assert_eq!(positions, vec![Position::new(1, 1), Position::new(2, 2)]);
}

#[test]
fn test_occupancy_index() {
    let mut index = OccupancyIndex::new();
    let first = [cell(0, 1, 1), cell(1, 2, 1)];
    let second = [cell(2, 2, 1)];

    index.insert_all(OrganismId(10), &first);
    index.insert_all(OrganismId(11), &second);

    assert_eq!(index.len(), 2);
    assert_eq!(index.occupants(Position::new(1, 1)), &[OrganismId(10)]);
    assert_eq!(
        index.occupants(Position::new(2, 1)),
        &[OrganismId(10), OrganismId(11)]
    );
    assert!(index.occupants(Position::new(9, 9)).is_empty());

    index.clear();
    assert!(index.is_empty());
}

#[test]
fn test_boundary_collision() {
    let bounds = Bounds::from_world(20, 30, 2);
    assert_eq!(bounds.width, 16);
    assert_eq!(bounds.height, 26);

    assert!(bounds.collides(Position::new(0, 5)));
    assert!(bounds.collides(Position::new(16, 5)));
    assert!(bounds.collides(Position::new(5, 0)));
    assert!(bounds.collides(Position::new(5, 26)));
    assert!(!bounds.collides(Position::new(1, 1)));
    assert!(!bounds.collides(Position::new(15, 25)));
}

#[test]
fn test_extents() {
    let positions = [Position::new(2, 5), Position::new(4, 5), Position::new(3, 9)];
    assert_eq!(width_of(&positions), 3);
    assert_eq!(height_of(&positions), 5);
    assert_eq!(width_of(&[]), 0);
}

#[test]
fn test_sweep_keys() {
    // Horizontal jumps cover every key strictly in between
    assert_eq!(
        sweep_keys(Position::new(0, 0), Position::new(3, 0)),
        vec![Position::new(1, 0), Position::new(2, 0)]
    );
    assert_eq!(
        sweep_keys(Position::new(5, 0), Position::new(2, 0)),
        vec![Position::new(4, 0), Position::new(3, 0)]
    );

    // Vertical jumps only ever add the first step
    assert_eq!(
        sweep_keys(Position::new(0, 0), Position::new(0, 4)),
        vec![Position::new(0, 1)]
    );
    assert_eq!(
        sweep_keys(Position::new(0, 0), Position::new(0, -2)),
        vec![Position::new(0, -1)]
    );

    assert!(sweep_keys(Position::new(1, 1), Position::new(1, 1)).is_empty());
}
