//! Per-tier amenity query plan.
//!
//! The plan only says *what* to ask the map provider for. Issuing the queries
//! happens outside the scoring core.

use serde::Serialize;

use crate::facts::{AmenityCategory, TransportMode};
use crate::tier::CityTier;

/// Where a category is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchArea {
    /// Fixed radius in metres around the reference point.
    Radius(u32),
    /// Resolve the commune's administrative boundary and search inside it.
    AdministrativeArea,
}

impl SearchArea {
    /// A radius of 0 selects the administrative area.
    pub const fn from_radius(radius: u32) -> SearchArea {
        if radius == 0 {
            SearchArea::AdministrativeArea
        } else {
            SearchArea::Radius(radius)
        }
    }

    pub const fn radius_meters(self) -> u32 {
        match self {
            SearchArea::Radius(r) => r,
            SearchArea::AdministrativeArea => 0,
        }
    }
}

/// One provider query: tag key, accepted tag values and search area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
    pub category: AmenityCategory,
    pub tag: &'static str,
    pub filters: &'static [&'static str],
    pub search: SearchArea,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
}

const fn spec(
    category: AmenityCategory,
    tag: &'static str,
    filters: &'static [&'static str],
    radius: u32,
) -> QuerySpec {
    QuerySpec {
        category,
        tag,
        filters,
        search: SearchArea::from_radius(radius),
        transport_mode: None,
    }
}

const fn transport(
    mode: TransportMode,
    tag: &'static str,
    filters: &'static [&'static str],
    radius: u32,
) -> QuerySpec {
    QuerySpec {
        category: AmenityCategory::Transport,
        tag,
        filters,
        search: SearchArea::from_radius(radius),
        transport_mode: Some(mode),
    }
}

const SHOP: &[&str] = &["restaurant", "fast_food"];
const FOOD_STORE: &[&str] = &["supermarket"];
const HEALTHCARE: &[&str] = &["hospital", "clinic"];
const PUBLIC_SERVICES: &[&str] = &["police", "fire_station"];
const SCHOOL: &[&str] = &["school"];

macro_rules! tier_plan {
    (
        shop: $shop:expr,
        food: $food:expr,
        health: $health:expr,
        services: $services:expr,
        school: $school:expr,
        transport: $transport:expr $(,)?
    ) => {
        &[
            spec(AmenityCategory::Shop, "amenity", SHOP, $shop),
            spec(AmenityCategory::FoodStore, "shop", FOOD_STORE, $food),
            spec(AmenityCategory::Healthcare, "amenity", HEALTHCARE, $health),
            spec(AmenityCategory::PublicServices, "amenity", PUBLIC_SERVICES, $services),
            spec(AmenityCategory::School, "amenity", SCHOOL, $school),
            transport(TransportMode::BusStop, "highway", &["bus_stop"], $transport),
            transport(TransportMode::Subway, "station", &["subway"], $transport),
            transport(TransportMode::Tram, "railway", &["tram_stop"], $transport),
            transport(TransportMode::TrainStation, "railway", &["station"], $transport),
        ]
    };
}

static METROPOLIS: &[QuerySpec] = tier_plan! {
    shop: 500, food: 300, health: 1_000, services: 2_000, school: 500, transport: 500,
};
static LARGE_CITY: &[QuerySpec] = tier_plan! {
    shop: 1_000, food: 500, health: 2_000, services: 3_000, school: 1_000, transport: 1_000,
};
// Mid-sized towns search several categories across the whole commune.
static MID_TOWN: &[QuerySpec] = tier_plan! {
    shop: 2_000, food: 0, health: 0, services: 5_000, school: 0, transport: 1_500,
};
static SMALL_TOWN: &[QuerySpec] = tier_plan! {
    shop: 3_000, food: 2_000, health: 5_000, services: 5_000, school: 3_000, transport: 2_000,
};
static VILLAGE: &[QuerySpec] = tier_plan! {
    shop: 5_000, food: 5_000, health: 10_000, services: 10_000, school: 5_000, transport: 3_000,
};

/// Ordered query specs for a tier.
pub fn query_plan(tier: CityTier) -> &'static [QuerySpec] {
    match tier {
        CityTier::Village => VILLAGE,
        CityTier::SmallTown => SMALL_TOWN,
        CityTier::MidTown => MID_TOWN,
        CityTier::LargeCity => LARGE_CITY,
        CityTier::Metropolis => METROPOLIS,
    }
}

/// Search area used for `category` in `tier`. Transport reports the area of
/// its first sub-filter; all of them share one radius.
pub fn search_area(tier: CityTier, category: AmenityCategory) -> Option<SearchArea> {
    query_plan(tier)
        .iter()
        .find(|q| q.category == category)
        .map(|q| q.search)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tier_covers_every_category() {
        let categories = [
            AmenityCategory::Shop,
            AmenityCategory::FoodStore,
            AmenityCategory::Healthcare,
            AmenityCategory::PublicServices,
            AmenityCategory::School,
            AmenityCategory::Transport,
        ];
        for tier in CityTier::ALL {
            for category in categories {
                assert!(
                    search_area(tier, category).is_some(),
                    "{tier} is missing {category}"
                );
            }
        }
    }

    #[test]
    fn test_zero_radius_means_administrative_area() {
        assert_eq!(
            search_area(CityTier::MidTown, AmenityCategory::FoodStore),
            Some(SearchArea::AdministrativeArea)
        );
        assert_eq!(SearchArea::AdministrativeArea.radius_meters(), 0);
        assert_eq!(
            search_area(CityTier::MidTown, AmenityCategory::Shop),
            Some(SearchArea::Radius(2_000))
        );
    }

    #[test]
    fn test_metropolis_plan_order_and_radii() {
        let plan = query_plan(CityTier::Metropolis);
        assert_eq!(plan.len(), 9);
        assert_eq!(plan[0].category, AmenityCategory::Shop);
        assert_eq!(plan[0].filters, &["restaurant", "fast_food"]);
        assert_eq!(plan[1].search, SearchArea::Radius(300));
        assert_eq!(plan[8].transport_mode, Some(TransportMode::TrainStation));
    }

    #[test]
    fn test_transport_has_four_sub_filters_with_shared_radius() {
        for tier in CityTier::ALL {
            let transport: Vec<_> = query_plan(tier)
                .iter()
                .filter(|q| q.category == AmenityCategory::Transport)
                .collect();
            assert_eq!(transport.len(), 4);
            assert!(transport.iter().all(|q| q.search == transport[0].search));
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(query_plan(CityTier::Village), query_plan(CityTier::Village));
    }
}
