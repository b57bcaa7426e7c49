//! End-to-end planning scenarios.
//!
//! Run with: cargo test -p aqmaps-core --test flight_test

use aqmaps_core::{
    euclidean_distance, is_valid_heading, marker_style, step, BuildingPolygon, Coordinate,
    FlightPlanner, FlightRecord, FlightRules, Heading, NoFlyRegistry, Segment, Sensor,
    Termination,
};

const R: f64 = 0.0003;

fn sensor(location: &str, lon: f64, lat: f64, battery: f64, reading: Option<f64>) -> Sensor {
    Sensor {
        location: location.to_string(),
        position: Coordinate::new(lon, lat),
        battery,
        reading,
    }
}

fn square(min_lon: f64, min_lat: f64, size: f64) -> BuildingPolygon {
    BuildingPolygon::new(
        Some("test block".to_string()),
        vec![
            Coordinate::new(min_lon, min_lat),
            Coordinate::new(min_lon + size, min_lat),
            Coordinate::new(min_lon + size, min_lat + size),
            Coordinate::new(min_lon, min_lat + size),
            Coordinate::new(min_lon, min_lat),
        ],
    )
}

fn planner(buildings: Vec<BuildingPolygon>) -> FlightPlanner {
    let registry = NoFlyRegistry::new(buildings).unwrap();
    FlightPlanner::new(registry, FlightRules::default()).unwrap()
}

fn assert_flight_invariants(record: &FlightRecord, registry: &NoFlyRegistry) {
    assert!(record.moves_made() <= 150);
    assert_eq!(record.positions.len(), record.moves_made() + 1);
    assert_eq!(record.connections.len(), record.moves_made());
    assert_eq!(record.positions[0], record.launch);

    for heading in &record.headings {
        assert!(is_valid_heading(heading.degrees()), "heading {heading}");
    }
    for pair in record.positions.windows(2) {
        let d = euclidean_distance(pair[0], pair[1]);
        assert!((d - R).abs() < 1e-10, "step of {d}");
        assert!(
            registry
                .edges_crossed(&Segment::new(pair[0], pair[1]))
                .is_empty(),
            "move {:?} -> {:?} crosses a building",
            pair[0],
            pair[1]
        );
    }
    if record.termination == Termination::ClosedLoop {
        assert!(euclidean_distance(record.final_position(), record.launch) < R);
    }
}

#[test]
fn test_single_sensor_closed_loop() {
    let launch = Coordinate::new(-3.1879, 55.9445);
    let sensors = vec![sensor("slips.mass.baking", -3.1878, 55.9444, 90.0, Some(40.0))];

    let planner = planner(Vec::new());
    let record = planner.plan(launch, sensors);

    assert_flight_invariants(&record, planner.registry());
    assert_eq!(record.termination, Termination::ClosedLoop);
    assert!(record.moves_made() <= 5, "took {} moves", record.moves_made());
    assert!(record.connections[0].is_some());

    let visited: Vec<&Sensor> = record.visited_sensors().collect();
    assert_eq!(visited.len(), 1);
    assert_eq!(record.unvisited_sensors().count(), 0);
    assert_eq!(
        marker_style(visited[0].reading, visited[0].battery).color,
        "#40ff00"
    );
}

#[test]
fn test_sensors_visited_nearest_first() {
    let launch = Coordinate::new(-3.1880, 55.9440);
    let near = sensor("near.near.near", -3.1874, 55.9440, 50.0, Some(10.0));
    let far = sensor("far.far.far", -3.1862, 55.9440, 50.0, Some(10.0));

    let planner = planner(Vec::new());
    let record = planner.plan(launch, vec![far, near]);

    assert_flight_invariants(&record, planner.registry());
    assert_eq!(record.termination, Termination::ClosedLoop);
    let order: Vec<&str> = record
        .visited_sensors()
        .map(|s| s.location.as_str())
        .collect();
    assert_eq!(order, vec!["near.near.near", "far.far.far"]);
}

#[test]
fn test_building_between_drone_and_sensor() {
    let launch = Coordinate::new(-3.1877, 55.9440);
    let block = square(-3.1876, 55.9438, 0.0004);
    let planner = planner(vec![block]);
    let sensors = vec![sensor("far.side.sensor", -3.1867, 55.9444, 60.0, Some(150.0))];

    let record = planner.plan(launch, sensors);
    assert_flight_invariants(&record, planner.registry());

    // the straight first move would clip the west wall
    let desired = step(Heading::new(20).unwrap(), launch, R);
    assert!(planner
        .registry()
        .any_crossed(&Segment::new(launch, desired)));

    let first = record.positions[1];
    assert_ne!(first, desired);
    assert!(!planner.registry().any_crossed(&Segment::new(launch, first)));
}

#[test]
fn test_unreachable_sensor_exhausts_budget() {
    let launch = Coordinate::new(-3.1885, 55.9444);
    // east of the airspace boundary, never reachable
    let sensors = vec![sensor("out.of.bounds", -3.1700, 55.9444, 50.0, Some(20.0))];

    let planner = planner(Vec::new());
    let record = planner.plan(launch, sensors);

    assert_flight_invariants(&record, planner.registry());
    assert_eq!(record.moves_made(), 150);
    assert_eq!(record.termination, Termination::MoveBudgetExhausted);
    assert_eq!(record.visited_sensors().count(), 0);
    assert_eq!(record.unvisited_sensors().count(), 1);

    let airspace = FlightRules::default().airspace;
    assert!(record.positions.iter().all(|p| airspace.contains(*p)));
}

#[test]
fn test_independent_runs_in_parallel() {
    let launch = Coordinate::new(-3.1879, 55.9445);
    let sensors = vec![
        sensor("a.a.a", -3.1870, 55.9450, 50.0, Some(70.0)),
        sensor("b.b.b", -3.1890, 55.9438, 50.0, Some(200.0)),
        sensor("c.c.c", -3.1860, 55.9436, 5.0, None),
    ];
    let planner = planner(vec![square(-3.1884, 55.9446, 0.0003)]);

    let (left, right) = std::thread::scope(|scope| {
        let a = scope.spawn(|| planner.plan(launch, sensors.clone()));
        let b = scope.spawn(|| planner.plan(launch, sensors.clone()));
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_flight_invariants(&left, planner.registry());
    assert_eq!(left.positions, right.positions);
    assert_eq!(left.connections, right.connections);
    assert_eq!(left.termination, right.termination);
}

#[test]
fn test_every_move_clears_several_buildings() {
    let launch = Coordinate::new(-3.1880, 55.9440);
    let planner = planner(vec![
        square(-3.1876, 55.9438, 0.0004),
        square(-3.1868, 55.9444, 0.0005),
        square(-3.1895, 55.9449, 0.0004),
    ]);
    let sensors = vec![
        sensor("east.of.first", -3.1869, 55.9440, 50.0, Some(30.0)),
        sensor("north.of.second", -3.1865, 55.9452, 50.0, Some(90.0)),
        sensor("west.corner", -3.1900, 55.9446, 50.0, Some(140.0)),
        sensor("south.edge", -3.1884, 55.9431, 50.0, Some(250.0)),
    ];

    let record = planner.plan(launch, sensors);

    assert_flight_invariants(&record, planner.registry());
    let airspace = planner.rules().airspace;
    assert!(record.positions.iter().all(|p| airspace.contains(*p)));
}
