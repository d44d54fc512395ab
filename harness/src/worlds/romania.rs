//! Road map of Romania with straight-line distances to Bucharest.
//!
//! The classic route-finding benchmark. Road lengths are in km; the
//! straight-line distance is an admissible and consistent heuristic for
//! Bucharest as the goal.

use crate::problem::GraphProblemV1;

/// Undirected roads `(a, b, km)`, in a fixed order.
pub const ROADS: &[(&str, &str, f64)] = &[
    ("Arad", "Zerind", 75.0),
    ("Arad", "Sibiu", 140.0),
    ("Arad", "Timisoara", 118.0),
    ("Zerind", "Oradea", 71.0),
    ("Oradea", "Sibiu", 151.0),
    ("Timisoara", "Lugoj", 111.0),
    ("Lugoj", "Mehadia", 70.0),
    ("Mehadia", "Drobeta", 75.0),
    ("Drobeta", "Craiova", 120.0),
    ("Craiova", "Rimnicu Vilcea", 146.0),
    ("Craiova", "Pitesti", 138.0),
    ("Sibiu", "Fagaras", 99.0),
    ("Sibiu", "Rimnicu Vilcea", 80.0),
    ("Rimnicu Vilcea", "Pitesti", 97.0),
    ("Fagaras", "Bucharest", 211.0),
    ("Pitesti", "Bucharest", 101.0),
    ("Bucharest", "Giurgiu", 90.0),
    ("Bucharest", "Urziceni", 85.0),
    ("Urziceni", "Hirsova", 98.0),
    ("Hirsova", "Eforie", 86.0),
    ("Urziceni", "Vaslui", 142.0),
    ("Vaslui", "Iasi", 92.0),
    ("Iasi", "Neamt", 87.0),
];

/// Straight-line distance to Bucharest.
pub const STRAIGHT_LINE_TO_BUCHAREST: &[(&str, f64)] = &[
    ("Arad", 366.0),
    ("Bucharest", 0.0),
    ("Craiova", 160.0),
    ("Drobeta", 242.0),
    ("Eforie", 161.0),
    ("Fagaras", 176.0),
    ("Giurgiu", 77.0),
    ("Hirsova", 151.0),
    ("Iasi", 226.0),
    ("Lugoj", 244.0),
    ("Mehadia", 241.0),
    ("Neamt", 234.0),
    ("Oradea", 380.0),
    ("Pitesti", 100.0),
    ("Rimnicu Vilcea", 193.0),
    ("Sibiu", 253.0),
    ("Timisoara", 329.0),
    ("Urziceni", 80.0),
    ("Vaslui", 199.0),
    ("Zerind", 374.0),
];

/// Route from `start` to Bucharest, with the straight-line heuristic.
#[must_use]
pub fn to_bucharest(start: &str) -> GraphProblemV1 {
    let mut problem = ROADS
        .iter()
        .fold(GraphProblemV1::new(false, start, "Bucharest"), |p, &(a, b, km)| {
            p.with_edge(a, b, km)
        });
    problem.heuristic = STRAIGHT_LINE_TO_BUCHAREST
        .iter()
        .map(|&(city, km)| (city.to_string(), km))
        .collect();
    problem
}
