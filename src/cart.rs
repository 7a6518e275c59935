// Quote/cart aggregator: ordered, in-memory line items for one session

use serde::Serialize;
use tracing::debug;

use crate::catalog::{VehicleCategory, VehicleListing};
use crate::pricing::{BookingRequest, PriceQuote, PricingEngine};

/// What `Cart::remove` does when the same vehicle was added more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    #[default]
    FirstMatch,
    AllMatches,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineItem {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub category: VehicleCategory,
    pub request: BookingRequest,
    pub quote: PriceQuote,
}

impl CartLineItem {
    pub fn new(vehicle: &VehicleListing, request: BookingRequest, quote: PriceQuote) -> Self {
        Self {
            vehicle_id: vehicle.id.clone(),
            vehicle_name: vehicle.name.clone(),
            category: vehicle.category,
            request,
            quote,
        }
    }

    /// Prices `request` against `vehicle` and wraps the result.
    pub fn priced(vehicle: &VehicleListing, request: BookingRequest, engine: &PricingEngine) -> Self {
        let quote = engine.quote(vehicle, &request);
        Self::new(vehicle, request, quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CartTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub delivery_fees: f64,
    pub insurance_fees: f64,
    pub total: f64,
    pub vehicle_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartLineItem>,
    removal_policy: RemovalPolicy,
}

impl Cart {
    pub fn new(removal_policy: RemovalPolicy) -> Self {
        Self {
            items: Vec::new(),
            removal_policy,
        }
    }

    pub fn add(&mut self, item: CartLineItem) {
        debug!(vehicle_id = %item.vehicle_id, total = item.quote.total, "Adding line item to cart");
        self.items.push(item);
    }

    pub fn add_booking(
        &mut self,
        vehicle: &VehicleListing,
        request: BookingRequest,
        engine: &PricingEngine,
    ) -> &CartLineItem {
        self.add(CartLineItem::priced(vehicle, request, engine));
        &self.items[self.items.len() - 1]
    }

    /// Removes line items for `vehicle_id` according to the cart's policy.
    /// Returns how many were removed.
    pub fn remove(&mut self, vehicle_id: &str) -> usize {
        let removed = match self.removal_policy {
            RemovalPolicy::FirstMatch => {
                match self.items.iter().position(|i| i.vehicle_id == vehicle_id) {
                    Some(index) => {
                        self.items.remove(index);
                        1
                    }
                    None => 0,
                }
            }
            RemovalPolicy::AllMatches => {
                let before = self.items.len();
                self.items.retain(|i| i.vehicle_id != vehicle_id);
                before - self.items.len()
            }
        };

        debug!(vehicle_id, removed, "Removed line items from cart");
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Empties the cart, handing back its line items in insertion order.
    pub fn drain(&mut self) -> Vec<CartLineItem> {
        std::mem::take(&mut self.items)
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.quote.total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        self.items
            .iter()
            .fold(CartTotals::default(), |mut acc, item| {
                acc.subtotal += item.quote.subtotal;
                acc.discount += item.quote.discount_amount;
                acc.delivery_fees += item.quote.delivery_fee;
                acc.insurance_fees += item.quote.insurance_fee;
                acc.total += item.quote.total;
                acc.vehicle_count += item.request.effective_quantity();
                acc
            })
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
