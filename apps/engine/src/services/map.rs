//! Board topology service: storm-sector arithmetic and the reachability
//! heuristic.
//!
//! Sector math mirrors the 18-step storm track. Movement range uses a
//! hop-count heuristic over sector distance rather than a true adjacency
//! graph; the Polar Sink (sector 0) counts as adjacent to everything.

use crate::domain::map::{Map, POLAR_SECTOR, SECTORS};
use crate::error::{EngineError, NotFoundKind};

#[derive(Default)]
pub struct MapService;

impl MapService {
    /// Where the storm lands after moving `amount` sectors from `sector`.
    ///
    /// next = ((sector - 1 + amount) mod 18) + 1
    pub fn next_storm_sector(&self, sector: u8, amount: u32) -> u8 {
        (((sector as u32 - 1 + amount) % SECTORS as u32) + 1) as u8
    }

    /// The sectors the storm passes over, in order, moving `amount` from
    /// `start` (excluding `start` itself, wrapping 18 -> 1).
    pub fn storm_path(&self, start: u8, amount: u32) -> Vec<u8> {
        (1..=amount)
            .map(|step| self.next_storm_sector(start, step))
            .collect()
    }

    /// Wrapped distance between two sectors on the 18-sector track.
    pub fn sector_distance(&self, a: u8, b: u8) -> u32 {
        if a == POLAR_SECTOR || b == POLAR_SECTOR {
            return 1;
        }
        let forward = (b as i32 - a as i32).rem_euclid(SECTORS as i32) as u32;
        forward.min(SECTORS as u32 - forward)
    }

    /// Hop-count heuristic between two named territories: the wrapped sector
    /// distance, with a minimum of one hop between distinct territories.
    pub fn hop_distance(&self, map: &Map, from: &str, to: &str) -> Result<u32, EngineError> {
        let origin = map.territory(from).ok_or_else(|| {
            EngineError::not_found(NotFoundKind::Territory, format!("no territory named {from}"))
        })?;
        let destination = map.territory(to).ok_or_else(|| {
            EngineError::not_found(NotFoundKind::Territory, format!("no territory named {to}"))
        })?;
        if origin.name == destination.name {
            return Ok(0);
        }
        Ok(self.sector_distance(origin.sector, destination.sector).max(1))
    }

    /// Can forces cover `from -> to` within `range` hops?
    pub fn is_reachable(
        &self,
        map: &Map,
        from: &str,
        to: &str,
        range: u32,
    ) -> Result<bool, EngineError> {
        Ok(self.hop_distance(map, from, to)? <= range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map::Map;

    #[test]
    fn storm_wraps_eighteen_to_one() {
        let map_svc = MapService;
        assert_eq!(map_svc.next_storm_sector(18, 1), 1);
        assert_eq!(map_svc.next_storm_sector(17, 4), 3);
        assert_eq!(map_svc.next_storm_sector(5, 0), 5);
    }

    #[test]
    fn storm_path_lists_each_sector_crossed() {
        let map_svc = MapService;
        assert_eq!(map_svc.storm_path(1, 3), vec![2, 3, 4]);
        assert_eq!(map_svc.storm_path(17, 3), vec![18, 1, 2]);
        assert!(map_svc.storm_path(9, 0).is_empty());
    }

    #[test]
    fn sector_distance_takes_the_short_way_round() {
        let map_svc = MapService;
        assert_eq!(map_svc.sector_distance(1, 18), 1);
        assert_eq!(map_svc.sector_distance(2, 11), 9);
        assert_eq!(map_svc.sector_distance(4, 4), 0);
    }

    #[test]
    fn polar_sink_is_adjacent_to_everything() {
        let map_svc = MapService;
        let map = Map::standard();
        assert_eq!(map_svc.hop_distance(&map, "Polar Sink", "Sietch Tabr").unwrap(), 1);
        assert_eq!(map_svc.hop_distance(&map, "The Great Flat", "Polar Sink").unwrap(), 1);
    }

    #[test]
    fn unknown_territory_is_not_found() {
        let map_svc = MapService;
        let map = Map::standard();
        assert!(map_svc.hop_distance(&map, "Atlantis", "Arrakeen").is_err());
    }
}
