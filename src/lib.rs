// Booking core for a scooter, ATV and car rental storefront

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod http;
pub mod pricing;
pub mod session;
pub mod submission;

// Re-export key types for convenience
pub use availability::{AvailabilityOracle, DateSelection};
pub use cart::{Cart, CartLineItem, CartTotals, RemovalPolicy};
pub use catalog::{Catalog, CatalogError, VehicleCategory, VehicleListing};
pub use config::{ConfigError, GatewayConfig};
pub use gateway::{BookingGateway, GatewaySettings, SubmissionError, SubmissionReceipt};
pub use http::{CollaboratorError, FormCollector, MessageNotifier};
pub use pricing::{BookingEndpoint, BookingRequest, PriceQuote, PricingEngine, PricingPolicy};
pub use session::{BookingSession, Currency, Language, SessionPreferences};
pub use submission::{BookingSubmission, CustomerContact, FormFieldMap};
