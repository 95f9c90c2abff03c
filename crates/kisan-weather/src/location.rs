//! Favorite locations, location search and nearby districts.

use std::sync::Arc;

use haversine::{distance, Location as HaversineLocation, Units};
use parking_lot::Mutex;

use crate::geocode::{LocationSearch, MIN_QUERY_CHARS};
use crate::storage::{PreferenceStore, FAVORITES_KEY};
use crate::types::{FavoriteLocation, LocationCandidate, Place};

/// Major districts offered as "nearby" shortcuts.
const DISTRICTS: [(&str, f64, f64); 20] = [
    ("Mumbai", 19.076, 72.8777),
    ("Delhi", 28.6139, 77.209),
    ("Bangalore", 12.9716, 77.5946),
    ("Chennai", 13.0827, 80.2707),
    ("Kolkata", 22.5726, 88.3639),
    ("Hyderabad", 17.385, 78.4867),
    ("Pune", 18.5204, 73.8567),
    ("Ahmedabad", 23.0225, 72.5714),
    ("Jaipur", 26.9124, 75.7873),
    ("Lucknow", 26.8467, 80.9462),
    ("Bhopal", 23.2599, 77.4126),
    ("Patna", 25.5941, 85.1376),
    ("Chandigarh", 30.7333, 76.7794),
    ("Varanasi", 25.3176, 82.9739),
    ("Nagpur", 21.1458, 79.0882),
    ("Indore", 22.7196, 75.8577),
    ("Coimbatore", 11.0168, 76.9558),
    ("Visakhapatnam", 17.6868, 83.2185),
    ("Thiruvananthapuram", 8.5241, 76.9366),
    ("Guwahati", 26.1445, 91.7362),
];

/// The `count` districts closest to a point, nearest first.
///
/// The closest entry is skipped: it is normally the place itself.
pub fn nearby_districts(latitude: f64, longitude: f64, count: usize) -> Vec<Place> {
    let mut with_dist: Vec<(Place, f64)> = DISTRICTS
        .iter()
        .map(|&(name, lat, lon)| {
            let dist_km = distance(
                HaversineLocation {
                    latitude,
                    longitude,
                },
                HaversineLocation {
                    latitude: lat,
                    longitude: lon,
                },
                Units::Kilometers,
            );
            (Place::new(name, lat, lon), dist_km)
        })
        .collect();

    with_dist.sort_by(|a, b| a.1.total_cmp(&b.1));

    with_dist
        .into_iter()
        .skip(1)
        .take(count)
        .map(|(place, _)| place)
        .collect()
}

/// Favorites plus location search.
///
/// Favorites are read from the preference store once, at construction. Every
/// mutation writes the whole list back before returning.
pub struct LocationStore {
    store: Arc<PreferenceStore>,
    favorites: Mutex<Vec<FavoriteLocation>>,
    geocoder: Option<Arc<dyn LocationSearch>>,
}

impl LocationStore {
    pub fn load(store: Arc<PreferenceStore>) -> Self {
        let favorites = match store.load::<Vec<FavoriteLocation>>(FAVORITES_KEY) {
            Ok(favorites) => favorites.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Starting with no favorites: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} favorite locations", favorites.len());

        Self {
            store,
            favorites: Mutex::new(favorites),
            geocoder: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn LocationSearch>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Add a favorite, or move an existing one (same name, any casing) to the
    /// new coordinates without changing its position.
    pub fn add_favorite(&self, place: &Place) {
        let mut favorites = self.favorites.lock();

        match favorites
            .iter_mut()
            .find(|f| same_name(&f.name, &place.name))
        {
            Some(existing) => {
                existing.latitude = place.latitude;
                existing.longitude = place.longitude;
            }
            None => favorites.push(FavoriteLocation::new(
                place.name.clone(),
                place.latitude,
                place.longitude,
            )),
        }

        self.persist(&favorites);
    }

    /// Returns whether anything was removed.
    pub fn remove_favorite(&self, name: &str) -> bool {
        let mut favorites = self.favorites.lock();
        let before = favorites.len();
        favorites.retain(|f| !same_name(&f.name, name));

        let removed = favorites.len() != before;
        if removed {
            self.persist(&favorites);
        }
        removed
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites
            .lock()
            .iter()
            .any(|f| same_name(&f.name, name))
    }

    /// Favorites in insertion order.
    pub fn list_favorites(&self) -> Vec<FavoriteLocation> {
        self.favorites.lock().clone()
    }

    /// Candidate locations for free text.
    ///
    /// Uses the geocoder when one is configured and answers; otherwise falls
    /// back to favorites whose name starts with the query.
    pub async fn search(&self, query: &str) -> std::vec::IntoIter<LocationCandidate> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new().into_iter();
        }

        if let Some(geocoder) = self.geocoder.clone() {
            match geocoder.search(query).await {
                Ok(results) => return results.into_iter(),
                Err(e) => tracing::warn!("Geocoding failed, searching favorites: {}", e),
            }
        }

        let prefix = query.to_lowercase();
        self.favorites
            .lock()
            .iter()
            .filter(|f| f.name.to_lowercase().starts_with(&prefix))
            .map(LocationCandidate::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn persist(&self, favorites: &[FavoriteLocation]) {
        if let Err(e) = self.store.save(FAVORITES_KEY, favorites) {
            tracing::warn!("Favorites kept in memory only: {}", e);
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
