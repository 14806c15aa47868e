//! Tables printed by the command-line screens.

use super::sheet::{Sheet, amount, percent};
use crate::application::service::OccupancyReport;
use crate::domain::access::{Screen, Session};
use crate::domain::customer::Customer;
use crate::domain::dates::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::payment::Payment;
use crate::domain::rates::{Concept, TripSettings};
use crate::domain::report::{Dashboard, FinancialReport, Occupancy};

const CUSTOMER_HEADER: [&str; 12] = [
    "ID",
    "Nombre",
    "Teléfono",
    "Email",
    "Asientos",
    "Sencillas",
    "Dobles",
    "Triples",
    "Total",
    "Pagado",
    "Pendiente",
    "Estado",
];

fn metrics(name: &str) -> Sheet {
    Sheet::new(name, &["Concepto", "Valor"])
}

pub fn menu(session: &Session, screens: &[Screen]) -> Sheet {
    let mut sheet = Sheet::new("Menú", &["Pantalla", "Comando"]);
    for screen in screens {
        let command = match screen {
            Screen::Dashboard => "dashboard",
            Screen::NewCustomer => "customer add",
            Screen::EditCustomer => "customer edit | customer delete",
            Screen::RegisterPayment => "payment add",
            Screen::DeletePayment => "payment delete",
            Screen::ListCustomers => "customer list | customer show",
            Screen::Reports => "report",
            Screen::Statement => "kardex",
            Screen::Configuration => "config | reset | backup",
        };
        sheet.push([screen.title(), command]);
    }
    sheet.push([
        format!("Usuario: {} ({})", session.display_name, session.role),
        String::new(),
    ]);
    sheet
}

pub fn customer_row(c: &Customer) -> Vec<String> {
    vec![
        c.id.to_string(),
        c.name.clone(),
        c.phone.clone(),
        c.email.clone(),
        c.reservation.seats.to_string(),
        c.reservation.rooms.singles.to_string(),
        c.reservation.rooms.doubles.to_string(),
        c.reservation.rooms.triples.to_string(),
        amount(c.total_due),
        amount(c.total_paid),
        amount(c.balance),
        c.state().to_string(),
    ]
}

pub fn customers<'a, I>(list: I) -> Sheet
where
    I: IntoIterator<Item = &'a Customer>,
{
    let mut sheet = Sheet::new("Clientes", &CUSTOMER_HEADER);
    for c in list {
        sheet.push(customer_row(c));
    }
    sheet
}

pub fn payments(payments: &[Payment]) -> Sheet {
    let mut sheet = Sheet::new(
        "Pagos",
        &["No.", "Fecha", "Monto", "Método", "Referencia", "Notas", "Registrado"],
    );
    for (i, p) in payments.iter().enumerate() {
        sheet.push([
            (i + 1).to_string(),
            p.date.format(DATE_FORMAT).to_string(),
            amount(p.amount),
            p.method.label().to_string(),
            p.reference_or_dash().to_string(),
            p.notes.clone(),
            p.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }
    sheet
}

/// Headline figures followed by the per-customer progress table.
pub fn dashboard(dashboard: &Dashboard) -> Vec<Sheet> {
    let occupancy = &dashboard.occupancy;
    let collection = &dashboard.collection;
    let mut figures = metrics("Resumen");
    figures.push(["Clientes".to_string(), occupancy.customers.to_string()]);
    figures.push(["Asientos".to_string(), occupancy.seats.to_string()]);
    figures.push(["Habitaciones".to_string(), occupancy.rooms().to_string()]);
    figures.push(["Presupuesto total".to_string(), collection.budget.to_string()]);
    figures.push(["Total recaudado".to_string(), collection.collected.to_string()]);
    figures.push(["Por cobrar".to_string(), collection.pending.to_string()]);
    figures.push(["Avance de cobro".to_string(), percent(collection.collected_percent())]);

    let mut progress = Sheet::new(
        "Estado de pagos",
        &["ID", "Nombre", "Total", "Pagado", "Pendiente", "Avance", "Estado"],
    );
    for s in &dashboard.statuses {
        progress.push([
            s.id.to_string(),
            s.name.clone(),
            s.total_due.to_string(),
            s.total_paid.to_string(),
            s.balance.to_string(),
            percent(s.paid_percent),
            s.state.to_string(),
        ]);
    }
    vec![figures, progress]
}

pub fn summary(occupancy: &Occupancy) -> Sheet {
    let mut sheet = metrics("Resumen general");
    sheet.push(["Total de clientes".to_string(), occupancy.customers.to_string()]);
    for concept in Concept::ALL {
        sheet.push([
            concept.statement_label().to_string(),
            occupancy.quantity(concept).to_string(),
        ]);
    }
    sheet.push(["Total de habitaciones".to_string(), occupancy.rooms().to_string()]);
    sheet
}

pub fn financial(report: &FinancialReport) -> Vec<Sheet> {
    let collection = &report.collection;
    let mut figures = metrics("Reporte financiero");
    figures.push(["Presupuesto total".to_string(), collection.budget.to_string()]);
    figures.push(["Total recaudado".to_string(), collection.collected.to_string()]);
    figures.push(["Por cobrar".to_string(), collection.pending.to_string()]);
    figures.push(["Avance de cobro".to_string(), percent(collection.collected_percent())]);
    vec![figures, super::sheet::revenue_sheet(report)]
}

pub fn occupancy(report: &OccupancyReport) -> Sheet {
    let seats = &report.seats;
    let mut sheet = metrics("Ocupación");
    sheet.push(["Capacidad del autobús".to_string(), seats.capacity.to_string()]);
    sheet.push(["Asientos ocupados".to_string(), seats.occupied.to_string()]);
    sheet.push(["Asientos disponibles".to_string(), seats.available().to_string()]);
    sheet.push(["Ocupación".to_string(), percent(seats.occupied_percent())]);
    for concept in [Concept::SingleRoom, Concept::DoubleRoom, Concept::TripleRoom] {
        sheet.push([
            concept.statement_label().to_string(),
            report.rooms.quantity(concept).to_string(),
        ]);
    }
    sheet
}

pub fn settings(settings: &TripSettings) -> Sheet {
    let mut sheet = metrics("Configuración");
    for concept in Concept::ALL {
        sheet.push([
            concept.revenue_label().to_string(),
            settings.rates.rate(concept).to_string(),
        ]);
    }
    sheet.push([
        "Fecha del viaje".to_string(),
        settings
            .trip_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::Role;
    use crate::domain::report::SeatAvailability;

    #[test]
    fn test_menu_lists_visible_screens() {
        let session = Session {
            username: "consulta".to_string(),
            display_name: "Consulta".to_string(),
            role: Role::Viewer,
        };
        let sheet = menu(&session, &Role::Viewer.menu());
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.rows[0][1], "dashboard");
        assert_eq!(sheet.rows[3][0], "Usuario: Consulta (viewer)");
    }

    #[test]
    fn test_occupancy_shows_overbooking() {
        let report = OccupancyReport {
            seats: SeatAvailability {
                capacity: 50,
                occupied: 52,
            },
            rooms: Occupancy::default(),
        };
        let sheet = occupancy(&report);
        assert_eq!(sheet.rows[2], vec!["Asientos disponibles", "-2"]);
        assert_eq!(sheet.rows[3], vec!["Ocupación", "104.0%"]);
    }

    #[test]
    fn test_settings_without_trip_date() {
        let sheet = settings(&TripSettings::default());
        assert_eq!(sheet.rows[0], vec!["Transporte", "$400.00"]);
        assert_eq!(sheet.rows[4], vec!["Fecha del viaje", "-"]);
    }
}
