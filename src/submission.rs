// Booking submission: the finalized cart plus contact details, and the two
// outbound renderings of it (form fields and the operator chat message)

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use crate::cart::CartLineItem;
use crate::pricing::BookingEndpoint;
use crate::session::{Currency, Language};

pub const CHAT_ID_SUFFIX: &str = "@c.us";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CustomerContact {
    pub first_name: String,
    pub last_name: String,
    /// Includes the country code, e.g. `+52 612 555 0101`.
    pub phone: String,
    pub email: String,
}

impl CustomerContact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Form field ids on the collection service. Composite fields get
/// `[<subfield>]` appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldMap {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub dropoff_date: String,
    pub dropoff_time: String,
    pub vehicle: String,
    pub extras: String,
    pub total_price: String,
    pub quantity: String,
    pub summary: String,
    pub reference: String,
}

impl Default for FormFieldMap {
    fn default() -> Self {
        Self {
            name: "3".to_string(),
            email: "4".to_string(),
            phone: "5".to_string(),
            pickup_date: "6".to_string(),
            pickup_time: "7".to_string(),
            dropoff_date: "8".to_string(),
            dropoff_time: "9".to_string(),
            vehicle: "10".to_string(),
            extras: "11".to_string(),
            total_price: "12".to_string(),
            quantity: "13".to_string(),
            summary: "14".to_string(),
            reference: "15".to_string(),
        }
    }
}

struct Labels {
    heading: &'static str,
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    days: &'static str,
    delivery: &'static str,
    insurance: &'static str,
    no_extras: &'static str,
    total: &'static str,
}

const EN: Labels = Labels {
    heading: "New booking request",
    name: "Name",
    phone: "Phone",
    email: "Email",
    days: "days",
    delivery: "Delivery",
    insurance: "Insurance",
    no_extras: "No extras",
    total: "Total",
};

const ES: Labels = Labels {
    heading: "Nueva solicitud de reserva",
    name: "Nombre",
    phone: "Teléfono",
    email: "Correo",
    days: "días",
    delivery: "Entrega",
    insurance: "Seguro",
    no_extras: "Sin extras",
    total: "Total",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Es => &ES,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingSubmission {
    /// Client-generated token carried through both outbound calls so that
    /// a resubmission can be recognized downstream.
    pub reference: String,
    pub contact: CustomerContact,
    pub items: Vec<CartLineItem>,
    pub language: Language,
}

impl BookingSubmission {
    pub fn new(contact: CustomerContact, items: Vec<CartLineItem>, language: Language) -> Self {
        Self {
            reference: generate_reference(),
            contact,
            items,
            language,
        }
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.quote.total).sum()
    }

    pub fn quantity(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.request.effective_quantity())
            .sum()
    }

    pub fn vehicle_names(&self) -> String {
        self.items
            .iter()
            .map(|i| i.vehicle_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn extras(&self, labels: &Labels) -> String {
        let delivery = self.items.iter().any(|i| i.request.delivery);
        let insurance = self.items.iter().any(|i| i.request.insurance);
        extras_text(delivery, insurance, labels)
    }

    /// One line per booked vehicle followed by the grand total.
    pub fn summary(&self) -> String {
        let labels = labels(self.language);
        let mut lines: Vec<String> = self
            .items
            .iter()
            .enumerate()
            .map(|(n, item)| {
                format!(
                    "{}. {} x{} | {} - {} | {} {} | {} | {}",
                    n + 1,
                    item.vehicle_name,
                    item.request.effective_quantity(),
                    format_endpoint(&item.request.pickup),
                    format_endpoint(&item.request.dropoff),
                    item.quote.days,
                    labels.days,
                    extras_text(item.request.delivery, item.request.insurance, labels),
                    Currency::Mxn.format(item.quote.total),
                )
            })
            .collect();
        lines.push(format!(
            "{}: {}",
            labels.total,
            Currency::Mxn.format(self.total())
        ));
        lines.join("\n")
    }

    /// Operator alert for the messaging service.
    pub fn chat_message(&self) -> String {
        let labels = labels(self.language);
        format!(
            "{} {}\n{}: {}\n{}: {}\n{}: {}\n\n{}",
            labels.heading,
            self.reference,
            labels.name,
            self.contact.full_name(),
            labels.phone,
            self.contact.phone,
            labels.email,
            self.contact.email,
            self.summary()
        )
    }

    /// URL-encodable key/value pairs for the form collection service.
    /// Dates and times come from the first line item; dates that were never
    /// picked are left out, missing times are sent as 10:00.
    pub fn form_fields(&self, fields: &FormFieldMap) -> Vec<(String, String)> {
        let mut form = FormBuilder::default();

        form.composite(&fields.name, "first", self.contact.first_name.trim());
        form.composite(&fields.name, "last", self.contact.last_name.trim());
        form.composite(&fields.phone, "full", self.contact.phone.trim());
        form.scalar(&fields.email, self.contact.email.trim());

        if let Some(first) = self.items.first() {
            form.endpoint(&fields.pickup_date, &fields.pickup_time, &first.request.pickup);
            form.endpoint(&fields.dropoff_date, &fields.dropoff_time, &first.request.dropoff);
        }

        form.scalar(&fields.vehicle, &self.vehicle_names());
        form.scalar(&fields.extras, &self.extras(&EN));
        form.scalar(&fields.total_price, &self.total().to_string());
        form.scalar(&fields.quantity, &self.quantity().to_string());
        form.scalar(&fields.summary, &self.summary());
        form.scalar(&fields.reference, &self.reference);

        form.pairs
    }
}

#[derive(Default)]
struct FormBuilder {
    pairs: Vec<(String, String)>,
}

impl FormBuilder {
    fn scalar(&mut self, field_id: &str, value: &str) {
        self.pairs
            .push((format!("submission[{}]", field_id), value.to_string()));
    }

    fn composite(&mut self, field_id: &str, subfield: &str, value: &str) {
        self.pairs.push((
            format!("submission[{}][{}]", field_id, subfield),
            value.to_string(),
        ));
    }

    fn date(&mut self, field_id: &str, date: NaiveDate) {
        self.composite(field_id, "month", &format!("{:02}", date.month()));
        self.composite(field_id, "day", &format!("{:02}", date.day()));
        self.composite(field_id, "year", &date.year().to_string());
    }

    // The same time goes out three ways; different form widgets read different keys
    fn endpoint(&mut self, date_field: &str, time_field: &str, endpoint: &BookingEndpoint) {
        if let Some(date) = endpoint.date {
            self.date(date_field, date);
        }
        let time = endpoint.time_or_default();
        self.composite(time_field, "timeInput", &time.format("%H:%M").to_string());
        self.composite(time_field, "hourSelect", &format!("{:02}", time.hour()));
        self.composite(time_field, "minuteSelect", &format!("{:02}", time.minute()));
    }
}

fn extras_text(delivery: bool, insurance: bool, labels: &Labels) -> String {
    match (delivery, insurance) {
        (true, true) => format!("{}, {}", labels.delivery, labels.insurance),
        (true, false) => labels.delivery.to_string(),
        (false, true) => labels.insurance.to_string(),
        (false, false) => labels.no_extras.to_string(),
    }
}

fn format_endpoint(endpoint: &BookingEndpoint) -> String {
    match endpoint.date {
        Some(date) => format!(
            "{} {}",
            date.format("%Y-%m-%d"),
            endpoint.time_or_default().format("%H:%M")
        ),
        None => "?".to_string(),
    }
}

fn generate_reference() -> String {
    format!("BK-{:08X}", rand::random::<u32>())
}

/// Builds the messaging-service chat id from a configured phone number:
/// `+52 612...` and `52612...@c.us` both become `52612...@c.us`.
pub fn normalize_chat_id(destination: &str) -> String {
    let trimmed = destination.trim();
    let number = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let number = number.strip_suffix(CHAT_ID_SUFFIX).unwrap_or(number);
    format!("{}{}", number, CHAT_ID_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{VehicleCategory, VehicleListing};
    use crate::pricing::{BookingRequest, PricingEngine};
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scooter_item(request: BookingRequest) -> CartLineItem {
        let scooter = VehicleListing {
            id: "scooter-125".to_string(),
            name: "Italika DS 125".to_string(),
            category: VehicleCategory::Scooter,
            daily_price: 400.0,
            images: vec![],
            description: None,
        };
        CartLineItem::priced(&scooter, request, &PricingEngine::default())
    }

    fn three_day_item() -> CartLineItem {
        scooter_item(BookingRequest::new(
            "scooter-125",
            BookingEndpoint::new(date(2024, 1, 1), "10:00"),
            BookingEndpoint::new(date(2024, 1, 4), "09:30"),
        ))
    }

    fn contact() -> CustomerContact {
        CustomerContact {
            first_name: "Ana".to_string(),
            last_name: "López".to_string(),
            phone: "+52 612 555 0101".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    fn field<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test_case("+5216125550101", "5216125550101@c.us"; "leading plus")]
    #[test_case("5216125550101@c.us", "5216125550101@c.us"; "already suffixed")]
    #[test_case("+5216125550101@c.us", "5216125550101@c.us"; "plus and suffix")]
    #[test_case(" 5216125550101 ", "5216125550101@c.us"; "surrounding whitespace")]
    fn test_normalize_chat_id(destination: &str, expected: &str) {
        assert_eq!(normalize_chat_id(destination), expected);
    }

    #[test]
    fn test_reference_format() {
        let submission = BookingSubmission::new(contact(), vec![three_day_item()], Language::En);
        assert!(submission.reference.starts_with("BK-"));
        assert_eq!(submission.reference.len(), 11);
    }

    #[test]
    fn test_form_fields() {
        let submission = BookingSubmission::new(contact(), vec![three_day_item()], Language::En);
        let pairs = submission.form_fields(&FormFieldMap::default());

        assert_eq!(field(&pairs, "submission[3][first]"), Some("Ana"));
        assert_eq!(field(&pairs, "submission[3][last]"), Some("López"));
        assert_eq!(field(&pairs, "submission[5][full]"), Some("+52 612 555 0101"));
        assert_eq!(field(&pairs, "submission[4]"), Some("ana@example.com"));

        assert_eq!(field(&pairs, "submission[6][month]"), Some("01"));
        assert_eq!(field(&pairs, "submission[6][day]"), Some("01"));
        assert_eq!(field(&pairs, "submission[6][year]"), Some("2024"));
        assert_eq!(field(&pairs, "submission[7][timeInput]"), Some("10:00"));
        assert_eq!(field(&pairs, "submission[7][hourSelect]"), Some("10"));
        assert_eq!(field(&pairs, "submission[7][minuteSelect]"), Some("00"));

        assert_eq!(field(&pairs, "submission[8][day]"), Some("04"));
        assert_eq!(field(&pairs, "submission[9][timeInput]"), Some("09:30"));
        assert_eq!(field(&pairs, "submission[9][hourSelect]"), Some("09"));
        assert_eq!(field(&pairs, "submission[9][minuteSelect]"), Some("30"));

        assert_eq!(field(&pairs, "submission[10]"), Some("Italika DS 125"));
        assert_eq!(field(&pairs, "submission[11]"), Some("No extras"));
        assert_eq!(field(&pairs, "submission[12]"), Some("1140"));
        assert_eq!(field(&pairs, "submission[13]"), Some("1"));
        assert_eq!(
            field(&pairs, "submission[15]"),
            Some(submission.reference.as_str())
        );
        assert!(field(&pairs, "submission[14]").unwrap().contains("Italika DS 125"));
    }

    #[test]
    fn test_form_fields_collapse_multiple_items() {
        let second = scooter_item(
            BookingRequest::new(
                "scooter-125",
                BookingEndpoint::new(date(2024, 2, 1), "10:00"),
                BookingEndpoint::new(date(2024, 2, 2), "10:00"),
            )
            .with_quantity(2)
            .with_delivery(true),
        );
        let submission =
            BookingSubmission::new(contact(), vec![three_day_item(), second], Language::Es);
        let pairs = submission.form_fields(&FormFieldMap::default());

        assert_eq!(
            field(&pairs, "submission[10]"),
            Some("Italika DS 125, Italika DS 125")
        );
        assert_eq!(field(&pairs, "submission[13]"), Some("3"));
        // Machine-readable extras stay in English whatever the visitor's language
        assert_eq!(field(&pairs, "submission[11]"), Some("Delivery"));
        // Dates come from the first line item
        assert_eq!(field(&pairs, "submission[6][month]"), Some("01"));
        assert_eq!(field(&pairs, "submission[12]"), Some(submission.total().to_string().as_str()));
    }

    #[test]
    fn test_form_fields_without_dates() {
        let item = scooter_item(BookingRequest::new(
            "scooter-125",
            BookingEndpoint::default(),
            BookingEndpoint::default(),
        ));
        let submission = BookingSubmission::new(contact(), vec![item], Language::En);
        let pairs = submission.form_fields(&FormFieldMap::default());

        assert_eq!(field(&pairs, "submission[6][month]"), None);
        assert_eq!(field(&pairs, "submission[7][timeInput]"), Some("10:00"));
        assert_eq!(field(&pairs, "submission[9][timeInput]"), Some("10:00"));
    }

    #[test]
    fn test_custom_field_ids() {
        let fields = FormFieldMap {
            email: "42".to_string(),
            ..FormFieldMap::default()
        };
        let submission = BookingSubmission::new(contact(), vec![three_day_item()], Language::En);
        let pairs = submission.form_fields(&fields);
        assert_eq!(field(&pairs, "submission[42]"), Some("ana@example.com"));
        assert_eq!(field(&pairs, "submission[4]"), None);
    }

    #[test]
    fn test_summary() {
        let submission = BookingSubmission::new(contact(), vec![three_day_item()], Language::En);
        assert_eq!(
            submission.summary(),
            "1. Italika DS 125 x1 | 2024-01-01 10:00 - 2024-01-04 09:30 | 3 days | No extras | $1,140 MXN\n\
             Total: $1,140 MXN"
        );
    }

    #[test]
    fn test_chat_message_is_localized() {
        let submission = BookingSubmission::new(contact(), vec![three_day_item()], Language::Es);
        let message = submission.chat_message();

        assert!(message.starts_with(&format!(
            "Nueva solicitud de reserva {}",
            submission.reference
        )));
        assert!(message.contains("Nombre: Ana López"));
        assert!(message.contains("Teléfono: +52 612 555 0101"));
        assert!(message.contains("3 días"));
        assert!(message.contains("Sin extras"));
    }
}
