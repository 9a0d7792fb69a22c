//! Roads: directed edges between junctions carrying vehicles and pollution
//!
//! Every road shares the same per-tick protocol (decay, speed limit, move
//! vehicles, reorder). The two road kinds only differ in the three policy
//! sub-steps, expressed by [`RoadPolicy`].

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::types::{check_name, JunctionId, RoadId, VehicleId, Weather};
use super::vehicle::Vehicle;

/// Kind-specific rules applied by [`Road::advance`]
pub trait RoadPolicy {
    /// Accumulated CO2 after this tick's decay. Must not exceed `co2`.
    fn decayed_co2(&self, co2: u64, weather: Weather) -> u64;

    /// Speed limit for this tick
    fn speed_limit(&self, road: &Road) -> u32;

    /// Speed assigned to a vehicle on this road for this tick
    fn vehicle_speed(&self, road: &Road, vehicle: &Vehicle) -> u32;
}

/// Urban road: constant decay, never throttled, cleaner vehicles go faster
#[derive(Debug, Clone, Copy, Default)]
pub struct CityRoad;

/// CO2 removed per tick on a city road in calm weather
pub const CITY_DECAY: u64 = 2;

/// CO2 removed per tick on a city road in windy or stormy weather
pub const CITY_DECAY_WINDY: u64 = 10;

impl RoadPolicy for CityRoad {
    fn decayed_co2(&self, co2: u64, weather: Weather) -> u64 {
        let decay = match weather {
            Weather::Windy | Weather::Storm => CITY_DECAY_WINDY,
            _ => CITY_DECAY,
        };
        co2.saturating_sub(decay)
    }

    fn speed_limit(&self, road: &Road) -> u32 {
        road.max_speed()
    }

    fn vehicle_speed(&self, road: &Road, vehicle: &Vehicle) -> u32 {
        let factor = 11 - u64::from(vehicle.cont_class());
        (factor * u64::from(road.speed_limit()) / 11) as u32
    }
}

/// Road between cities: percentage decay, halved limit over the CO2 alarm
#[derive(Debug, Clone, Copy, Default)]
pub struct InterCityRoad;

impl InterCityRoad {
    /// Percentage of accumulated CO2 that dissipates per tick
    fn decay_percent(weather: Weather) -> u64 {
        match weather {
            Weather::Sunny => 2,
            Weather::Cloudy => 3,
            Weather::Rainy => 10,
            Weather::Windy => 15,
            Weather::Storm => 20,
        }
    }
}

impl RoadPolicy for InterCityRoad {
    fn decayed_co2(&self, co2: u64, weather: Weather) -> u64 {
        (100 - Self::decay_percent(weather)) * co2 / 100
    }

    fn speed_limit(&self, road: &Road) -> u32 {
        if road.total_co2() > road.cont_limit() {
            road.max_speed() / 2
        } else {
            road.max_speed()
        }
    }

    fn vehicle_speed(&self, road: &Road, _vehicle: &Vehicle) -> u32 {
        if road.weather() == Weather::Storm {
            (u64::from(road.speed_limit()) * 8 / 10) as u32
        } else {
            road.speed_limit()
        }
    }
}

/// The closed set of road kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadKind {
    City,
    InterCity,
}

impl RoadKind {
    pub fn policy(self) -> &'static dyn RoadPolicy {
        match self {
            RoadKind::City => &CityRoad,
            RoadKind::InterCity => &InterCityRoad,
        }
    }
}

/// A directed road between two junctions
#[derive(Debug, Clone)]
pub struct Road {
    id: RoadId,
    name: String,
    kind: RoadKind,
    src: JunctionId,
    dest: JunctionId,
    length: u32,
    max_speed: u32,
    speed_limit: u32,
    /// CO2 alarm threshold
    cont_limit: u64,
    weather: Weather,
    total_co2: u64,
    /// Vehicles on the road, lead vehicle first after each advance
    vehicles: Vec<VehicleId>,
}

impl Road {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RoadId,
        name: impl Into<String>,
        kind: RoadKind,
        src: JunctionId,
        dest: JunctionId,
        length: u32,
        max_speed: u32,
        cont_limit: u64,
        weather: Weather,
    ) -> Result<Self> {
        let name = name.into();
        check_name("road", &name)?;
        if max_speed == 0 {
            return Err(SimError::validation(format!(
                "road {name}: max speed must be positive"
            )));
        }
        if length == 0 {
            return Err(SimError::validation(format!(
                "road {name}: length must be positive"
            )));
        }

        Ok(Self {
            id,
            name,
            kind,
            src,
            dest,
            length,
            max_speed,
            speed_limit: max_speed,
            cont_limit,
            weather,
            total_co2: 0,
            vehicles: Vec::new(),
        })
    }

    /// Put a vehicle at the start of the road. It must be stopped at location 0.
    pub fn enter(&mut self, vehicle: &Vehicle) -> Result<()> {
        if vehicle.location() != 0 {
            return Err(SimError::state(format!(
                "vehicle {} must be at location 0 to enter road {}, found {}",
                vehicle.name(),
                self.name,
                vehicle.location()
            )));
        }
        if vehicle.speed() != 0 {
            return Err(SimError::state(format!(
                "vehicle {} must be stopped to enter road {}",
                vehicle.name(),
                self.name
            )));
        }
        self.vehicles.push(vehicle.id());
        Ok(())
    }

    /// Remove a vehicle from the road; absent vehicles are ignored
    pub fn exit(&mut self, vehicle: VehicleId) {
        self.vehicles.retain(|id| *id != vehicle);
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    pub fn add_contamination(&mut self, co2: u64) {
        self.total_co2 = self.total_co2.saturating_add(co2);
    }

    /// Run one tick over this road.
    ///
    /// `vehicles` is the world's vehicle table, indexed by [`VehicleId`].
    /// Returns the vehicles that reached the end of the road this tick, in the
    /// order they moved; each must be queued at its next junction.
    pub fn advance(&mut self, vehicles: &mut [Vehicle], _tick: u32) -> Vec<VehicleId> {
        let policy = self.kind.policy();

        let decayed = policy.decayed_co2(self.total_co2, self.weather);
        self.total_co2 = decayed.min(self.total_co2);

        self.speed_limit = policy.speed_limit(self);

        let mut arrived = Vec::new();
        for vehicle_id in &self.vehicles {
            let vehicle = &mut vehicles[vehicle_id.index()];
            let speed = policy.vehicle_speed(self, vehicle);
            vehicle.set_speed(speed);

            let step = vehicle.advance(self.length);
            self.total_co2 = self.total_co2.saturating_add(step.co2);
            if step.reached_end {
                debug!("Vehicle {} reached the end of road {}", vehicle.name(), self.name);
                arrived.push(*vehicle_id);
            }
        }

        // Stable, so vehicles at the same location keep their entry order
        self.vehicles
            .sort_by_key(|id| std::cmp::Reverse(vehicles[id.index()].location()));

        arrived
    }

    pub fn id(&self) -> RoadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RoadKind {
        self.kind
    }

    pub fn src(&self) -> JunctionId {
        self.src
    }

    pub fn dest(&self) -> JunctionId {
        self.dest
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn max_speed(&self) -> u32 {
        self.max_speed
    }

    pub fn speed_limit(&self) -> u32 {
        self.speed_limit
    }

    pub fn cont_limit(&self) -> u64 {
        self.cont_limit
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn total_co2(&self) -> u64 {
        self.total_co2
    }

    pub fn vehicles(&self) -> &[VehicleId] {
        &self.vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::SimId;
    use crate::simulation::vehicle::RoadLookup;

    struct SingleRoad;

    impl RoadLookup for SingleRoad {
        fn road_between(&self, _from: JunctionId, _to: JunctionId) -> Option<RoadId> {
            Some(RoadId(SimId(0)))
        }

        fn junction_name(&self, _id: JunctionId) -> &str {
            "j"
        }
    }

    fn road(
        kind: RoadKind,
        length: u32,
        max_speed: u32,
        cont_limit: u64,
        weather: Weather,
    ) -> Road {
        Road::new(
            RoadId(SimId(0)),
            "r1",
            kind,
            JunctionId(SimId(0)),
            JunctionId(SimId(1)),
            length,
            max_speed,
            cont_limit,
            weather,
        )
        .unwrap()
    }

    fn traveling_vehicle(
        index: usize,
        max_speed: u32,
        cont_class: u8,
        road: &mut Road,
    ) -> Vehicle {
        let mut v = Vehicle::new(
            VehicleId(SimId(index)),
            format!("v{index}"),
            max_speed,
            cont_class,
            vec![JunctionId(SimId(0)), JunctionId(SimId(1))],
        )
        .unwrap();
        v.move_to_next_road(&SingleRoad).unwrap();
        road.enter(&v).unwrap();
        v
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let make = |length, max_speed, name: &str| {
            Road::new(
                RoadId(SimId(0)),
                name,
                RoadKind::City,
                JunctionId(SimId(0)),
                JunctionId(SimId(1)),
                length,
                max_speed,
                0,
                Weather::Sunny,
            )
        };
        assert!(make(0, 10, "r").is_err());
        assert!(make(10, 0, "r").is_err());
        assert!(make(10, 10, "").is_err());
        assert!(make(10, 10, "r").is_ok());
    }

    #[test]
    fn test_city_decay() {
        let city = CityRoad;
        assert_eq!(city.decayed_co2(50, Weather::Sunny), 48);
        assert_eq!(city.decayed_co2(50, Weather::Windy), 40);
        assert_eq!(city.decayed_co2(50, Weather::Storm), 40);
        assert_eq!(city.decayed_co2(1, Weather::Rainy), 0);
        assert_eq!(city.decayed_co2(7, Weather::Storm), 0);
    }

    #[test]
    fn test_inter_city_decay_truncates() {
        let inter = InterCityRoad;
        assert_eq!(inter.decayed_co2(1000, Weather::Sunny), 980);
        assert_eq!(inter.decayed_co2(1000, Weather::Cloudy), 970);
        assert_eq!(inter.decayed_co2(1000, Weather::Rainy), 900);
        assert_eq!(inter.decayed_co2(1000, Weather::Windy), 850);
        assert_eq!(inter.decayed_co2(1000, Weather::Storm), 800);
        // 98 * 49 / 100 = 48.02
        assert_eq!(inter.decayed_co2(49, Weather::Sunny), 48);
        assert_eq!(inter.decayed_co2(1, Weather::Sunny), 0);
    }

    #[test]
    fn test_enter_requires_stopped_vehicle_at_start() {
        let mut r = road(RoadKind::City, 100, 50, 0, Weather::Sunny);
        let mut vehicles = vec![traveling_vehicle(0, 50, 0, &mut r)];
        r.advance(&mut vehicles, 1);
        assert!(vehicles[0].location() > 0);
        assert!(r.enter(&vehicles[0]).is_err());
    }

    #[test]
    fn test_enter_requires_zero_speed() {
        let mut r = road(RoadKind::City, 100, 50, 0, Weather::Sunny);
        let mut v = traveling_vehicle(0, 50, 0, &mut r);
        v.set_speed(30);
        assert_eq!(v.location(), 0);
        assert_eq!(v.speed(), 30);

        let mut other = road(RoadKind::City, 100, 50, 0, Weather::Sunny);
        let err = other.enter(&v).unwrap_err();
        assert!(matches!(err, SimError::State(_)));
        assert!(other.vehicles().is_empty());
    }

    #[test]
    fn test_exit_absent_vehicle_is_noop() {
        let mut r = road(RoadKind::City, 100, 50, 0, Weather::Sunny);
        r.exit(VehicleId(SimId(7)));
        assert!(r.vehicles().is_empty());
    }

    #[test]
    fn test_city_clean_vehicle_runs_at_limit() {
        let mut r = road(RoadKind::City, 1000, 120, 0, Weather::Sunny);
        let mut vehicles = vec![traveling_vehicle(0, 200, 0, &mut r)];

        let arrived = r.advance(&mut vehicles, 1);
        assert!(arrived.is_empty());
        assert_eq!(vehicles[0].speed(), 120);
        assert_eq!(vehicles[0].location(), 120);
        assert_eq!(r.total_co2(), 0);
    }

    #[test]
    fn test_city_speed_by_class_and_contamination() {
        let mut r = road(RoadKind::City, 1000, 110, 0, Weather::Sunny);
        let mut vehicles = vec![traveling_vehicle(0, 200, 10, &mut r)];

        r.advance(&mut vehicles, 1);
        // (11 - 10) * 110 / 11
        assert_eq!(vehicles[0].speed(), 10);
        assert_eq!(vehicles[0].location(), 10);
        assert_eq!(r.total_co2(), 100);

        r.advance(&mut vehicles, 2);
        assert_eq!(r.total_co2(), 98 + 100);
    }

    #[test]
    fn test_location_capped_at_length_and_arrival_reported() {
        let mut r = road(RoadKind::City, 100, 120, 0, Weather::Sunny);
        let mut vehicles = vec![traveling_vehicle(0, 200, 0, &mut r)];

        let arrived = r.advance(&mut vehicles, 1);
        assert_eq!(arrived, vec![VehicleId(SimId(0))]);
        assert_eq!(vehicles[0].location(), 100);
        assert_eq!(vehicles[0].speed(), 0);

        // Waiting vehicles stay on the road and do not move
        let arrived = r.advance(&mut vehicles, 2);
        assert!(arrived.is_empty());
        assert_eq!(r.vehicles(), &[VehicleId(SimId(0))]);
    }

    #[test]
    fn test_inter_city_limit_halves_over_alarm() {
        let mut r = road(RoadKind::InterCity, 10_000, 100, 50, Weather::Sunny);
        let mut vehicles = vec![traveling_vehicle(0, 200, 1, &mut r)];

        r.advance(&mut vehicles, 1);
        assert_eq!(r.speed_limit(), 100);
        assert_eq!(r.total_co2(), 100);

        r.advance(&mut vehicles, 2);
        assert_eq!(r.speed_limit(), 50);
        assert_eq!(vehicles[0].speed(), 50);
    }

    #[test]
    fn test_inter_city_storm_slows_vehicles() {
        let mut r = road(RoadKind::InterCity, 10_000, 100, 1000, Weather::Storm);
        let mut vehicles = vec![traveling_vehicle(0, 200, 0, &mut r)];

        r.advance(&mut vehicles, 1);
        assert_eq!(r.speed_limit(), 100);
        assert_eq!(vehicles[0].speed(), 80);
    }

    #[test]
    fn test_inter_city_storm_with_huge_limit() {
        let mut r = road(RoadKind::InterCity, u32::MAX, 1_000_000_000, 1000, Weather::Storm);
        let mut vehicles = vec![traveling_vehicle(0, u32::MAX, 0, &mut r)];

        r.advance(&mut vehicles, 1);
        assert_eq!(r.speed_limit(), 1_000_000_000);
        assert_eq!(vehicles[0].speed(), 800_000_000);
        assert_eq!(vehicles[0].location(), 800_000_000);
    }

    #[test]
    fn test_vehicles_sorted_lead_first() {
        let mut r = road(RoadKind::City, 1000, 110, 0, Weather::Sunny);
        let slow = traveling_vehicle(0, 20, 0, &mut r);
        let fast = traveling_vehicle(1, 90, 0, &mut r);
        let mut vehicles = vec![slow, fast];

        r.advance(&mut vehicles, 1);
        assert_eq!(r.vehicles(), &[VehicleId(SimId(1)), VehicleId(SimId(0))]);

        let locations: Vec<u32> = r
            .vehicles()
            .iter()
            .map(|id| vehicles[id.index()].location())
            .collect();
        assert!(locations.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_decay_never_increases_co2() {
        let mut r = road(RoadKind::InterCity, 100, 10, 0, Weather::Sunny);
        r.add_contamination(333);
        let mut vehicles: Vec<Vehicle> = Vec::new();
        let mut previous = r.total_co2();
        let weathers = [
            Weather::Sunny,
            Weather::Cloudy,
            Weather::Rainy,
            Weather::Windy,
            Weather::Storm,
        ];
        for (tick, weather) in weathers.into_iter().enumerate() {
            r.set_weather(weather);
            r.advance(&mut vehicles, tick as u32);
            assert!(r.total_co2() <= previous);
            previous = r.total_co2();
        }
    }
}
