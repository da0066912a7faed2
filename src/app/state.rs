//! Duel wiring - builds both instances and cross-connects their links

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::game::geometry::{bearing_degrees, Position};
use crate::game::ship::{ControlledShip, ProxyShip, Ship};
use crate::game::{InstanceHandle, SimulationInstance};
use crate::net::link_pair;
use crate::net::protocol::PlayerSlot;

/// Starting positions for both ships
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub one: Position,
    pub two: Position,
}

impl SpawnPlan {
    /// Place the ships `separation` apart, mirrored about the origin, on a
    /// bearing drawn from `seed`
    pub fn generate(seed: u64, separation: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let half = separation / 2.0;
        let (dx, dy) = (angle.cos() * half, angle.sin() * half);

        Self {
            one: Position::new(-dx, -dy),
            two: Position::new(dx, dy),
        }
    }

    pub fn position(&self, slot: PlayerSlot) -> Position {
        match slot {
            PlayerSlot::One => self.one,
            PlayerSlot::Two => self.two,
        }
    }
}

/// Both instances, ready to run, plus their handles
pub struct Duel {
    pub instances: Vec<SimulationInstance>,
    pub handles: Vec<InstanceHandle>,
    pub spawn: SpawnPlan,
}

impl Duel {
    pub fn new(config: &Config) -> Self {
        let spawn = SpawnPlan::generate(config.seed, config.separation);
        let (link_one, link_two) = link_pair(config.link_capacity);

        let mut instances = Vec::with_capacity(2);
        let mut handles = Vec::with_capacity(2);

        for (slot, link) in [(PlayerSlot::One, link_one), (PlayerSlot::Two, link_two)] {
            let own = spawn.position(slot);
            let opponent = spawn.position(slot.opponent());
            let tuning = config.constants.ship;

            // Both start facing each other; each proxy starts at the opponent's true spawn
            let controlled =
                ControlledShip::new(Ship::new(slot, own, bearing_degrees(own, opponent), tuning));
            let proxy = ProxyShip::new(Ship::new(
                slot.opponent(),
                opponent,
                bearing_degrees(opponent, own),
                tuning,
            ));

            let (instance, handle) = SimulationInstance::new(
                slot,
                controlled,
                proxy,
                link,
                config.constants.speed_of_light,
            );
            instances.push(instance);
            handles.push(handle);
        }

        Self {
            instances,
            handles,
            spawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::distance;
    use crate::game::ship::ShipView;

    #[test]
    fn test_spawn_is_seeded_and_separated() {
        let a = SpawnPlan::generate(7, 600.0);
        let b = SpawnPlan::generate(7, 600.0);
        assert_eq!(a, b);
        assert!((distance(a.one, a.two) - 600.0).abs() < 1e-9);
        assert!((a.one.x + a.two.x).abs() < 1e-9);

        let c = SpawnPlan::generate(8, 600.0);
        assert_ne!(a, c);
    }

    #[test]
    fn test_duel_instances_mirror_each_other() {
        let config = Config::default();
        let duel = Duel::new(&config);

        assert_eq!(duel.instances.len(), 2);
        assert_eq!(duel.handles[0].slot, PlayerSlot::One);
        assert_eq!(duel.handles[1].slot, PlayerSlot::Two);

        let one = &duel.instances[0];
        let two = &duel.instances[1];
        assert_eq!(one.controlled().ship.position(), two.proxy().ship.position());
        assert_eq!(two.controlled().ship.position(), one.proxy().ship.position());
        assert_eq!(one.proxy().pose().slot, PlayerSlot::Two);
    }

    #[test]
    fn test_duel_links_are_cross_wired() {
        let config = Config::default();
        let mut duel = Duel::new(&config);

        let mut two = duel.instances.pop().unwrap();
        let mut one = duel.instances.pop().unwrap();

        // Ships 600 apart at 100 u/s: 6 s of transit
        let sent = one.tick(0.0).unwrap().sent.unwrap();
        assert!((sent.delay - 6.0).abs() < 1e-9);

        assert!(two.tick(5.9).unwrap().applied.is_none());
        let applied = two.tick(6.0 + 1e-9).unwrap().applied;
        assert_eq!(applied, Some(sent));
    }
}
