//! Demo network generator
//!
//! Builds a grid of junctions connected by two-way roads and a stream of
//! vehicles whose itineraries are shortest paths over the grid. Everything is
//! expressed as scenario events so the demo runs through the same path as a
//! loaded scenario file.

use anyhow::{Context, Result};
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::events::{
    DequeuingSpec, Event, LightSwitchingSpec, NewJunction, NewRoad, NewVehicle, NoData, SetWeather,
    TimeslotData, WeatherChange,
};
use super::types::Weather;

/// Distance between neighbouring grid junctions, in coordinate units
const GRID_SPACING: u32 = 100;

const WEATHERS: [Weather; 5] = [
    Weather::Sunny,
    Weather::Cloudy,
    Weather::Rainy,
    Weather::Windy,
    Weather::Storm,
];

/// Shape of the generated demo
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    /// Junctions per side of the square grid
    pub grid_size: usize,
    pub vehicles: usize,
    /// Vehicles are spawned uniformly over ticks `1..=spawn_window`
    pub spawn_window: u32,
    pub seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            vehicles: 12,
            spawn_window: 10,
            seed: 42,
        }
    }
}

/// Generate the events of a demo scenario
pub fn generate_demo(config: &DemoConfig) -> Result<Vec<Event>> {
    anyhow::ensure!(config.grid_size >= 2, "Demo grid needs at least 2x2 junctions");
    anyhow::ensure!(config.spawn_window >= 1, "Spawn window must be at least one tick");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut events = Vec::new();
    let mut graph: DiGraph<String, u32> = DiGraph::new();
    let size = config.grid_size;

    // Junctions
    let mut grid = vec![vec![NodeIndex::new(0); size]; size];
    for (row, cells) in grid.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            let name = format!("j{}_{}", row, col);
            let ls_strategy = if rng.random_bool(0.5) {
                LightSwitchingSpec::RoundRobin(TimeslotData {
                    timeslot: rng.random_range(1..=5),
                })
            } else {
                LightSwitchingSpec::MostCrowded(TimeslotData {
                    timeslot: rng.random_range(1..=5),
                })
            };
            let dq_strategy = if rng.random_bool(0.5) {
                DequeuingSpec::MoveFirst(NoData {})
            } else {
                DequeuingSpec::MoveAll(NoData {})
            };
            events.push(Event::NewJunction(NewJunction {
                time: 1,
                id: name.clone(),
                coor: [col as u32 * GRID_SPACING, row as u32 * GRID_SPACING],
                ls_strategy,
                dq_strategy,
            }));
            *cell = graph.add_node(name);
        }
    }

    // Two-way roads between horizontal and vertical neighbours
    let mut road_names = Vec::new();
    let mut connect = |a: NodeIndex, b: NodeIndex, rng: &mut StdRng, events: &mut Vec<Event>| {
        let inter_city = rng.random_bool(0.3);
        let length = rng.random_range(50..=300);
        let maxspeed = if inter_city {
            rng.random_range(80..=120)
        } else {
            rng.random_range(30..=60)
        };
        let weather = *WEATHERS.choose(rng).unwrap_or(&Weather::Sunny);
        for (src, dest) in [(a, b), (b, a)] {
            let name = format!("r{}", road_names.len());
            let road = NewRoad {
                time: 1,
                id: name.clone(),
                src: graph[src].clone(),
                dest: graph[dest].clone(),
                length,
                co2limit: u64::from(length) * 2,
                maxspeed,
                weather,
            };
            events.push(if inter_city {
                Event::NewInterCityRoad(road)
            } else {
                Event::NewCityRoad(road)
            });
            graph.add_edge(src, dest, length);
            road_names.push(name);
        }
    };
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                connect(grid[row][col], grid[row][col + 1], &mut rng, &mut events);
            }
            if row + 1 < size {
                connect(grid[row][col], grid[row + 1][col], &mut rng, &mut events);
            }
        }
    }

    // Vehicles on shortest paths between random distinct junctions
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for index in 0..config.vehicles {
        let start = *nodes.choose(&mut rng).context("Demo grid has no junctions")?;
        let end = loop {
            let candidate = *nodes.choose(&mut rng).context("Demo grid has no junctions")?;
            if candidate != start {
                break candidate;
            }
        };

        let (_, path) = astar(&graph, start, |node| node == end, |edge| *edge.weight(), |_| 0)
            .context("No path between demo junctions")?;

        events.push(Event::NewVehicle(NewVehicle {
            time: rng.random_range(1..=config.spawn_window),
            id: format!("v{}", index),
            maxspeed: rng.random_range(40..=150),
            class: rng.random_range(0..=10),
            itinerary: path.into_iter().map(|node| graph[node].clone()).collect(),
        }));
    }

    // A mid-run weather change on a random road
    if let Some(road) = road_names.choose(&mut rng) {
        events.push(Event::SetWeather(SetWeather {
            time: config.spawn_window,
            info: vec![WeatherChange {
                road: road.clone(),
                weather: Weather::Storm,
            }],
        }));
    }

    Ok(events)
}
