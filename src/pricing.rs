// Pricing engine: turns a booking request into a price quote
// Pure and synchronous. Bad input is coerced, never rejected.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::VehicleListing;

pub const DEFAULT_TIME: &str = "10:00";
const DEFAULT_HOUR: u32 = 10;
const DEFAULT_MINUTE: u32 = 0;

/// One end of a rental period: a calendar day plus a 24-hour `HH:MM` time.
/// Either half may be missing while the visitor is still filling in the form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct BookingEndpoint {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

impl BookingEndpoint {
    pub fn new(date: NaiveDate, time: &str) -> Self {
        Self {
            date: Some(date),
            time: Some(time.to_string()),
        }
    }

    pub fn date_only(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            time: None,
        }
    }

    /// Time string if one was entered, ignoring blanks.
    fn entered_time(&self) -> Option<&str> {
        self.time.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Combined instant, or `None` when the date or the time is absent.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        let date = self.date?;
        let time = self.entered_time()?;
        Some(date.and_time(parse_time_of_day(time)))
    }

    /// Time of day with the storefront default applied.
    pub fn time_or_default(&self) -> NaiveTime {
        parse_time_of_day(self.entered_time().unwrap_or(DEFAULT_TIME))
    }
}

/// Parses `HH:MM`. Each component that fails to parse falls back to 10:00.
pub fn parse_time_of_day(raw: &str) -> NaiveTime {
    let mut parts = raw.trim().splitn(2, ':');
    let hour = parts
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_HOUR)
        .min(23);
    let minute = parts
        .next()
        .and_then(|m| m.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_MINUTE)
        .min(59);

    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRequest {
    pub vehicle_id: String,
    pub pickup: BookingEndpoint,
    pub dropoff: BookingEndpoint,
    pub quantity: u32,
    pub delivery: bool,
    pub insurance: bool,
}

impl BookingRequest {
    pub fn new(vehicle_id: &str, pickup: BookingEndpoint, dropoff: BookingEndpoint) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            pickup,
            dropoff,
            quantity: 1,
            delivery: false,
            insurance: false,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_delivery(mut self, delivery: bool) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_insurance(mut self, insurance: bool) -> Self {
        self.insurance = insurance;
        self
    }

    /// Quantity as priced; zero is treated as one vehicle.
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub duration_hours: f64,
    pub days: u32,
    pub subtotal: f64,
    pub time_discount_pct: f64,
    pub quantity_discount_pct: f64,
    pub discount_amount: f64,
    pub delivery_fee: f64,
    pub insurance_fee: f64,
    pub total: f64,
}

impl PriceQuote {
    pub fn combined_discount_pct(&self) -> f64 {
        self.time_discount_pct + self.quantity_discount_pct
    }
}

/// A discount that applies once `min` (days or vehicles) is reached.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DiscountTier {
    pub min: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricingPolicy {
    pub time_tiers: Vec<DiscountTier>,
    pub quantity_tiers: Vec<DiscountTier>,
    pub delivery_fee_per_vehicle: f64,
    pub insurance_rate: f64,
    pub fallback_duration_hours: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            time_tiers: vec![
                DiscountTier { min: 3, percent: 5.0 },
                DiscountTier { min: 7, percent: 10.0 },
                DiscountTier { min: 14, percent: 15.0 },
            ],
            quantity_tiers: vec![
                DiscountTier { min: 2, percent: 5.0 },
                DiscountTier { min: 4, percent: 10.0 },
            ],
            delivery_fee_per_vehicle: 100.0,
            insurance_rate: 0.10,
            fallback_duration_hours: 24.0,
        }
    }
}

impl PricingPolicy {
    pub fn time_discount_pct(&self, days: u32) -> f64 {
        tier_percent(&self.time_tiers, days)
    }

    pub fn quantity_discount_pct(&self, quantity: u32) -> f64 {
        tier_percent(&self.quantity_tiers, quantity)
    }
}

// Highest threshold reached wins; below every threshold means no discount
fn tier_percent(tiers: &[DiscountTier], value: u32) -> f64 {
    tiers
        .iter()
        .filter(|tier| value >= tier.min)
        .max_by_key(|tier| tier.min)
        .map_or(0.0, |tier| tier.percent)
}

#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    policy: PricingPolicy,
}

impl PricingEngine {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Rental length in hours, falling back to a single day when an endpoint
    /// is incomplete or the range is empty or inverted.
    pub fn duration_hours(&self, request: &BookingRequest) -> f64 {
        let span = request
            .pickup
            .instant()
            .zip(request.dropoff.instant())
            .map(|(pickup, dropoff)| (dropoff - pickup).num_seconds() as f64 / 3600.0);

        match span {
            Some(hours) if hours > 0.0 => hours,
            _ => self.policy.fallback_duration_hours,
        }
    }

    pub fn quote(&self, vehicle: &VehicleListing, request: &BookingRequest) -> PriceQuote {
        let duration_hours = self.duration_hours(request);
        let days = ((duration_hours / 24.0).ceil() as u32).max(1);
        let quantity = request.effective_quantity();

        let subtotal = vehicle.daily_price * days as f64 * quantity as f64;

        let time_discount_pct = self.policy.time_discount_pct(days);
        let quantity_discount_pct = self.policy.quantity_discount_pct(quantity);
        let discount_amount = subtotal * (time_discount_pct + quantity_discount_pct) / 100.0;

        let delivery_fee = if request.delivery {
            self.policy.delivery_fee_per_vehicle * quantity as f64
        } else {
            0.0
        };
        let insurance_fee = if request.insurance {
            (subtotal * self.policy.insurance_rate).round()
        } else {
            0.0
        };

        let total = subtotal - discount_amount + delivery_fee + insurance_fee;

        debug!(
            vehicle_id = %vehicle.id,
            days,
            quantity,
            subtotal,
            discount_amount,
            total,
            "Computed price quote"
        );

        PriceQuote {
            duration_hours,
            days,
            subtotal,
            time_discount_pct,
            quantity_discount_pct,
            discount_amount,
            delivery_fee,
            insurance_fee,
            total,
        }
    }
}
