use super::customer::{Customer, CustomerId};
use super::rates::TripSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The whole state of a trip as one document.
///
/// This is the on-disk layout of the local JSON file and of backups:
/// `clientes` keyed by id (payments embedded), `configuracion` and
/// `fecha_viaje` at the top level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripSnapshot {
    #[serde(rename = "clientes", default)]
    pub customers: BTreeMap<CustomerId, Customer>,
    #[serde(flatten)]
    pub settings: TripSettings,
}

impl TripSnapshot {
    pub fn new(customers: Vec<Customer>, settings: TripSettings) -> Self {
        Self {
            customers: customers.into_iter().map(|c| (c.id.clone(), c)).collect(),
            settings,
        }
    }

    /// Parses a document and restores each customer's id from its key.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let mut snapshot: TripSnapshot = serde_json::from_slice(bytes)?;
        for (id, customer) in snapshot.customers.iter_mut() {
            customer.id = id.clone();
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    const DOCUMENT: &str = r#"{
      "clientes": {
        "CLI001": {
          "nombre": "Juan Pérez García",
          "telefono": "3331234567",
          "email": "",
          "asientos": 2,
          "habitaciones": {"sencillas": 0, "dobles": 1, "triples": 0},
          "total_a_pagar": 1600,
          "total_pagado": 500.0,
          "saldo_pendiente": 1100.0,
          "pagos": [
            {
              "fecha": "05/01/2026",
              "monto": 500.0,
              "metodo": "Efectivo",
              "referencia": "",
              "notas": "",
              "timestamp": "05/01/2026 18:22:10"
            }
          ],
          "notas": "Ventanilla",
          "fecha_registro": "02/01/2026 11:00:00"
        }
      },
      "configuracion": {
        "transporte": 400,
        "habitacion_sencilla": 600,
        "habitacion_doble": 800,
        "habitacion_triple": 1000
      },
      "fecha_viaje": null
    }"#;

    #[test]
    fn test_reads_existing_document() {
        let snapshot = TripSnapshot::from_json(DOCUMENT.as_bytes()).unwrap();
        let id = CustomerId::new("CLI001");
        let customer = &snapshot.customers[&id];
        assert_eq!(customer.id, id);
        assert_eq!(customer.payments.len(), 1);
        assert_eq!(customer.balance, Money::new(dec!(1100)));
        assert_eq!(snapshot.settings.trip_date, None);
    }

    #[test]
    fn test_written_document_keeps_layout() {
        let snapshot = TripSnapshot::from_json(DOCUMENT.as_bytes()).unwrap();
        let bytes = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["clientes"]["CLI001"]["pagos"].is_array());
        assert_eq!(value["configuracion"]["transporte"], 400.0);
        assert!(value["fecha_viaje"].is_null());

        let again = TripSnapshot::from_json(&bytes).unwrap();
        assert_eq!(again, snapshot);
    }
}
