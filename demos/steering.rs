//! Steering demo: a swarm of agents whose thrust and turn rate come from
//! their replicant matrices.
//!
//! Run with: `RUST_LOG=debug cargo run --example steering`

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use replicant_matrix::{Activation, AgentId, EngineConfig, MatrixBlueprint, Population};
use tracing::info;
use tracing_subscriber::EnvFilter;

const AGENTS: usize = 256;
const TICKS: usize = 50;
const SENSOR_RANGE: f32 = 100.0;

/// Host-side physical state; the matrix only sees normalized sensor readings.
struct Ship {
    id: AgentId,
    position: [f32; 2],
    heading: f32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let config = EngineConfig::with_activation(Activation::Sigmoid);
    let mut population = Population::with_capacity(config, AGENTS);

    // Sensors: distance to origin, bearing to origin. Controls: thrust, turn.
    let mut ships: Vec<Ship> = (0..AGENTS)
        .map(|_| {
            let blueprint = MatrixBlueprint::fully_connected(2, 2, 1.0, &mut rng)
                .expect("weight range is finite");
            Ship {
                id: population
                    .spawn(&blueprint)
                    .expect("fully connected blueprints are valid"),
                position: [
                    rng.random_range(-SENSOR_RANGE..SENSOR_RANGE),
                    rng.random_range(-SENSOR_RANGE..SENSOR_RANGE),
                ],
                heading: rng.random_range(0.0..std::f32::consts::TAU),
            }
        })
        .collect();

    for tick in 0..TICKS {
        for ship in &ships {
            let [x, y] = ship.position;
            let distance = x.hypot(y).min(SENSOR_RANGE);
            let bearing = (-y).atan2(-x) - ship.heading;
            population
                .write_inputs(ship.id, &[distance / SENSOR_RANGE, bearing.sin()])
                .expect("ship is alive");
        }

        let summary = population.step();

        let mut mean_distance = 0.0;
        for ship in &mut ships {
            let Some(outputs) = population.outputs(ship.id) else {
                continue;
            };
            let (thrust, turn) = (outputs[0], outputs[1] - 0.5);
            ship.heading += turn * 0.2;
            ship.position[0] += ship.heading.cos() * thrust;
            ship.position[1] += ship.heading.sin() * thrust;
            mean_distance += ship.position[0].hypot(ship.position[1]);
        }
        mean_distance /= ships.len() as f32;

        if tick % 10 == 0 {
            info!(
                tick = summary.tick,
                agents = summary.agents,
                interactions = summary.interactions,
                mean_distance,
                "tick complete"
            );
        }
    }

    // Retire the ships that drifted furthest.
    ships.sort_by(|a, b| {
        let da = a.position[0].hypot(a.position[1]);
        let db = b.position[0].hypot(b.position[1]);
        db.total_cmp(&da)
    });
    for ship in ships.drain(..AGENTS / 4) {
        population.despawn(ship.id);
    }
    info!(remaining = population.len(), "despawned stragglers");
}
