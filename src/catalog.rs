// Vehicle catalog: immutable reference data loaded at startup

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Duplicate vehicle id: {0}")]
    DuplicateId(String),

    #[error("Invalid daily price for {0}")]
    InvalidPrice(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Scooter,
    Atv,
    Car,
}

impl VehicleCategory {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Scooter => "Scooter",
            VehicleCategory::Atv => "ATV",
            VehicleCategory::Car => "Car",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default)]
    pub es: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleListing {
    pub id: String,
    pub name: String,
    pub category: VehicleCategory,
    /// Price per day in the home currency (MXN).
    pub daily_price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CatalogFile {
    vehicles: Vec<VehicleListing>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    vehicles: Vec<VehicleListing>,
}

impl Catalog {
    pub fn new(vehicles: Vec<VehicleListing>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for vehicle in &vehicles {
            if !seen.insert(vehicle.id.as_str()) {
                return Err(CatalogError::DuplicateId(vehicle.id.clone()));
            }
            if !vehicle.daily_price.is_finite() || vehicle.daily_price < 0.0 {
                return Err(CatalogError::InvalidPrice(vehicle.id.clone()));
            }
        }
        Ok(Self { vehicles })
    }

    pub fn from_json(json_str: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json_str)
            .map_err(|e| CatalogError::JsonParseError(e.to_string()))?;
        Self::new(file.vehicles)
    }

    // Helper method to load the sample fleet shipped with the crate
    pub fn load_sample() -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(SAMPLE_CATALOG_PATH)?;
        Self::from_json(&content)
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&VehicleListing> {
        self.vehicles.iter().find(|v| v.id == vehicle_id)
    }

    pub fn by_category(&self, category: VehicleCategory) -> impl Iterator<Item = &VehicleListing> {
        self.vehicles.iter().filter(move |v| v.category == category)
    }

    pub fn vehicles(&self) -> &[VehicleListing] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

pub const SAMPLE_CATALOG_PATH: &str = "samples/fleet.json";
