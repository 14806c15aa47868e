use super::dates;
use super::money::Money;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rooms booked by a customer, per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomCounts {
    #[serde(rename = "sencillas", default)]
    pub singles: u32,
    #[serde(rename = "dobles", default)]
    pub doubles: u32,
    #[serde(rename = "triples", default)]
    pub triples: u32,
}

impl RoomCounts {
    pub fn total(&self) -> u32 {
        self.singles
            .saturating_add(self.doubles)
            .saturating_add(self.triples)
    }
}

/// Seats on the bus plus rooms at the hotel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "asientos", default)]
    pub seats: u32,
    #[serde(rename = "habitaciones", default)]
    pub rooms: RoomCounts,
}

impl Reservation {
    pub fn new(seats: u32, singles: u32, doubles: u32, triples: u32) -> Self {
        Self {
            seats,
            rooms: RoomCounts {
                singles,
                doubles,
                triples,
            },
        }
    }

    pub fn quantity(&self, concept: Concept) -> u32 {
        match concept {
            Concept::Seat => self.seats,
            Concept::SingleRoom => self.rooms.singles,
            Concept::DoubleRoom => self.rooms.doubles,
            Concept::TripleRoom => self.rooms.triples,
        }
    }
}

/// Something a customer can be charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    Seat,
    SingleRoom,
    DoubleRoom,
    TripleRoom,
}

impl Concept {
    pub const ALL: [Concept; 4] = [
        Concept::Seat,
        Concept::SingleRoom,
        Concept::DoubleRoom,
        Concept::TripleRoom,
    ];

    /// Label used on a customer's statement.
    pub fn statement_label(&self) -> &'static str {
        match self {
            Concept::Seat => "Asientos de Transporte",
            Concept::SingleRoom => "Habitaciones Sencillas",
            Concept::DoubleRoom => "Habitaciones Dobles",
            Concept::TripleRoom => "Habitaciones Triples",
        }
    }

    /// Label used on the revenue breakdown.
    pub fn revenue_label(&self) -> &'static str {
        match self {
            Concept::Seat => "Transporte",
            other => other.statement_label(),
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.statement_label())
    }
}

/// Unit prices applied to every total calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(rename = "transporte")]
    pub seat: Money,
    #[serde(rename = "habitacion_sencilla")]
    pub single_room: Money,
    #[serde(rename = "habitacion_doble")]
    pub double_room: Money,
    #[serde(rename = "habitacion_triple")]
    pub triple_room: Money,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            seat: Money::new(dec!(400)),
            single_room: Money::new(dec!(600)),
            double_room: Money::new(dec!(800)),
            triple_room: Money::new(dec!(1000)),
        }
    }
}

/// One row of a cost breakdown: how many, at what price, for how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakdownLine {
    pub concept: Concept,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl RateTable {
    pub fn rate(&self, concept: Concept) -> Money {
        match concept {
            Concept::Seat => self.seat,
            Concept::SingleRoom => self.single_room,
            Concept::DoubleRoom => self.double_room,
            Concept::TripleRoom => self.triple_room,
        }
    }

    /// Total due for a reservation at these rates.
    pub fn total_for(&self, reservation: &Reservation) -> Money {
        self.breakdown(reservation)
            .iter()
            .map(|line| line.subtotal)
            .sum()
    }

    /// Per-concept lines, always in seat, single, double, triple order.
    pub fn breakdown(&self, reservation: &Reservation) -> Vec<BreakdownLine> {
        Concept::ALL
            .iter()
            .map(|&concept| {
                let quantity = reservation.quantity(concept);
                let unit_price = self.rate(concept);
                BreakdownLine {
                    concept,
                    quantity,
                    unit_price,
                    subtotal: unit_price * quantity,
                }
            })
            .collect()
    }
}

/// Trip-wide configuration persisted next to the customer data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripSettings {
    #[serde(rename = "configuracion", default)]
    pub rates: RateTable,
    #[serde(rename = "fecha_viaje", default, with = "dates::optional_day")]
    pub trip_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_at_default_rates() {
        let rates = RateTable::default();
        let reservation = Reservation::new(2, 1, 0, 1);
        assert_eq!(rates.total_for(&reservation), Money::new(dec!(2400)));
    }

    #[test]
    fn test_total_for_empty_reservation_is_zero() {
        let rates = RateTable::default();
        assert_eq!(rates.total_for(&Reservation::default()), Money::ZERO);
    }

    #[test]
    fn test_total_follows_custom_rates() {
        let rates = RateTable {
            seat: Money::new(dec!(450.50)),
            single_room: Money::new(dec!(700)),
            double_room: Money::new(dec!(900)),
            triple_room: Money::new(dec!(1100)),
        };
        let reservation = Reservation::new(3, 0, 2, 1);
        // 3*450.50 + 2*900 + 1100
        assert_eq!(rates.total_for(&reservation), Money::new(dec!(4251.50)));
    }

    #[test]
    fn test_breakdown_lines() {
        let rates = RateTable::default();
        let lines = rates.breakdown(&Reservation::new(2, 0, 1, 0));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].concept, Concept::Seat);
        assert_eq!(lines[0].subtotal, Money::new(dec!(800)));
        assert_eq!(lines[1].quantity, 0);
        assert_eq!(lines[2].subtotal, Money::new(dec!(800)));
    }

    #[test]
    fn test_settings_json_layout() {
        let json = r#"{
            "configuracion": {
                "transporte": 400,
                "habitacion_sencilla": 600,
                "habitacion_doble": 800,
                "habitacion_triple": 1000
            },
            "fecha_viaje": "01/04/2026"
        }"#;
        let settings: TripSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.rates, RateTable::default());
        assert_eq!(settings.trip_date, NaiveDate::from_ymd_opt(2026, 4, 1));

        let no_date: TripSettings = serde_json::from_str(r#"{"fecha_viaje": null}"#).unwrap();
        assert_eq!(no_date.trip_date, None);
    }
}
