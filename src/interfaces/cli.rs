use super::csv::table_writer::TableWriter;
use super::export::{StatementFormat, export_ledger, export_statement};
use super::views;
use crate::application::service::{StatusFilter, TripService};
use crate::config::StorageType;
use crate::domain::customer::{CustomerDetails, CustomerId};
use crate::domain::dates;
use crate::domain::money::{Amount, Money};
use crate::domain::payment::{NewPayment, PaymentMethod};
use crate::domain::rates::{Reservation, TripSettings};
use crate::error::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tripledger", author, version, about = "Customers, reservations and payments for a group trip", long_about = None)]
pub struct Cli {
    /// Extra YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend, overriding the configuration
    #[arg(long, value_enum, global = true)]
    pub storage: Option<StorageType>,

    /// JSON file, sheets directory or database path for the chosen backend
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[arg(long, env = "TRIPLEDGER_USER", global = true)]
    pub user: Option<String>,

    #[arg(long, env = "TRIPLEDGER_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Screens available to the current user
    Menu,
    /// Headline figures and payment progress per customer
    Dashboard,
    #[command(subcommand)]
    Customer(CustomerCommand),
    #[command(subcommand)]
    Payment(PaymentCommand),
    #[command(subcommand)]
    Report(ReportCommand),
    /// Export a customer statement
    Kardex {
        id: String,
        #[arg(long, value_enum, default_value_t = FormatArg::Both)]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Delete every customer and payment, keeping the rates
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Write a JSON snapshot of the whole trip
    Backup {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value_t = 0)]
    pub seats: u32,
    #[arg(long, default_value_t = 0)]
    pub singles: u32,
    #[arg(long, default_value_t = 0)]
    pub doubles: u32,
    #[arg(long, default_value_t = 0)]
    pub triples: u32,
    #[arg(long, default_value = "")]
    pub notes: String,
}

/// Fields left out keep their current value.
#[derive(Args)]
pub struct CustomerEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub seats: Option<u32>,
    #[arg(long)]
    pub singles: Option<u32>,
    #[arg(long)]
    pub doubles: Option<u32>,
    #[arg(long)]
    pub triples: Option<u32>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    Add(CustomerArgs),
    Edit {
        id: String,
        #[command(flatten)]
        fields: CustomerEditArgs,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    List {
        /// Matches name or id (any case) or phone
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommand {
    Add {
        id: String,
        /// Defaults to the whole pending balance
        #[arg(long)]
        amount: Option<Decimal>,
        /// dd/mm/YYYY, defaults to today
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "Efectivo")]
        method: PaymentMethod,
        #[arg(long, default_value = "")]
        reference: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete {
        id: String,
        /// 1-based position in the customer's payment history
        number: usize,
        #[arg(long)]
        yes: bool,
    },
    /// Customers that still owe money
    Due,
    /// Customers with at least one payment
    Paid,
}

#[derive(Subcommand)]
pub enum ReportCommand {
    Summary,
    Financial,
    Occupancy,
    /// Write the full ledger workbook
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    Set {
        #[arg(long)]
        seat: Option<Decimal>,
        #[arg(long)]
        single: Option<Decimal>,
        #[arg(long)]
        double: Option<Decimal>,
        #[arg(long)]
        triple: Option<Decimal>,
        /// dd/mm/YYYY
        #[arg(long, value_parser = parse_day)]
        trip_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Document,
    Workbook,
    Both,
}

impl From<FormatArg> for StatementFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Document => StatementFormat::Document,
            FormatArg::Workbook => StatementFormat::Workbook,
            FormatArg::Both => StatementFormat::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    All,
    Settled,
    Pending,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Settled => StatusFilter::Settled,
            StatusArg::Pending => StatusFilter::Pending,
        }
    }
}

fn parse_day(value: &str) -> std::result::Result<NaiveDate, String> {
    dates::parse_date(value).ok_or_else(|| format!("'{}' is not a dd/mm/YYYY date", value))
}

fn rate(value: Option<Decimal>, current: Money) -> Result<Money> {
    match value {
        Some(v) => Ok(Amount::new(v)?.into()),
        None => Ok(current),
    }
}

impl From<CustomerArgs> for CustomerDetails {
    fn from(args: CustomerArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            email: args.email,
            reservation: Reservation::new(args.seats, args.singles, args.doubles, args.triples),
            notes: args.notes,
        }
    }
}

/// Runs one command, writing tables to `out` as CSV.
pub async fn run<W: Write>(service: &TripService, command: Command, out: W) -> Result<()> {
    let mut table = TableWriter::new(out);
    match command {
        Command::Menu => {
            table.write_sheet(&views::menu(service.session(), &service.menu()))?;
        }
        Command::Dashboard => {
            table.write_sheets(&views::dashboard(&service.dashboard().await?))?;
        }
        Command::Customer(cmd) => run_customer(service, cmd, &mut table).await?,
        Command::Payment(cmd) => run_payment(service, cmd, &mut table).await?,
        Command::Report(cmd) => match cmd {
            ReportCommand::Summary => {
                table.write_sheet(&views::summary(&service.summary().await?))?;
            }
            ReportCommand::Financial => {
                table.write_sheets(&views::financial(&service.financial().await?))?;
            }
            ReportCommand::Occupancy => {
                table.write_sheet(&views::occupancy(&service.occupancy().await?))?;
            }
            ReportCommand::Export { out } => {
                let ledger = service.ledger_export().await?;
                let dir = export_ledger(&ledger, service.now().date(), &out)?;
                writeln!(table.get_mut(), "{}", dir.display())?;
            }
        },
        Command::Kardex { id, format, out } => {
            let statement = service.statement(&CustomerId::new(id)).await?;
            for path in export_statement(&statement, format.into(), &out)? {
                writeln!(table.get_mut(), "{}", path.display())?;
            }
        }
        Command::Config(cmd) => match cmd {
            ConfigCommand::Show => {
                table.write_sheet(&views::settings(&service.settings().await?))?;
            }
            ConfigCommand::Set {
                seat,
                single,
                double,
                triple,
                trip_date,
            } => {
                let current = service.settings().await?;
                let mut rates = current.rates;
                rates.seat = rate(seat, rates.seat)?;
                rates.single_room = rate(single, rates.single_room)?;
                rates.double_room = rate(double, rates.double_room)?;
                rates.triple_room = rate(triple, rates.triple_room)?;
                let updated = service
                    .update_settings(TripSettings {
                        rates,
                        trip_date: trip_date.or(current.trip_date),
                    })
                    .await?;
                table.write_sheet(&views::settings(&updated))?;
            }
        },
        Command::Reset { yes } => {
            let removed = service.reset_data(yes).await?;
            writeln!(table.get_mut(), "{} customer(s) deleted", removed)?;
        }
        Command::Backup { out } => {
            let path = service.backup(&out).await?;
            writeln!(table.get_mut(), "{}", path.display())?;
        }
    }
    Ok(())
}

async fn run_customer<W: Write>(
    service: &TripService,
    cmd: CustomerCommand,
    table: &mut TableWriter<W>,
) -> Result<()> {
    match cmd {
        CustomerCommand::Add(args) => {
            let customer = service.register_customer(args.into()).await?;
            table.write_sheet(&views::customers([&customer]))?;
        }
        CustomerCommand::Edit { id, fields } => {
            let id = CustomerId::new(id);
            let current = service.customer(&id).await?;
            let rooms = current.reservation.rooms;
            let details = CustomerDetails {
                name: fields.name.unwrap_or(current.name),
                phone: fields.phone.unwrap_or(current.phone),
                email: fields.email.unwrap_or(current.email),
                reservation: Reservation::new(
                    fields.seats.unwrap_or(current.reservation.seats),
                    fields.singles.unwrap_or(rooms.singles),
                    fields.doubles.unwrap_or(rooms.doubles),
                    fields.triples.unwrap_or(rooms.triples),
                ),
                notes: fields.notes.unwrap_or(current.notes),
            };
            let customer = service.edit_customer(&id, details).await?;
            table.write_sheet(&views::customers([&customer]))?;
        }
        CustomerCommand::Delete { id, yes } => {
            let customer = service.delete_customer(&CustomerId::new(id), yes).await?;
            writeln!(
                table.get_mut(),
                "Deleted {} ({}) and {} payment(s)",
                customer.id,
                customer.name,
                customer.payments.len()
            )?;
        }
        CustomerCommand::List { search, status } => {
            let customers = service.search_customers(&search, status.into()).await?;
            table.write_sheet(&views::customers(&customers))?;
        }
        CustomerCommand::Show { id } => {
            let customer = service.customer(&CustomerId::new(id)).await?;
            table.write_sheets(&[
                views::customers([&customer]),
                views::payments(&customer.payments),
            ])?;
        }
    }
    Ok(())
}

async fn run_payment<W: Write>(
    service: &TripService,
    cmd: PaymentCommand,
    table: &mut TableWriter<W>,
) -> Result<()> {
    match cmd {
        PaymentCommand::Add {
            id,
            amount,
            date,
            method,
            reference,
            notes,
        } => {
            let new = NewPayment {
                amount: amount.map(Amount::new).transpose()?,
                date: date.unwrap_or_else(|| service.now().date()),
                method,
                reference,
                notes,
            };
            let (customer, _) = service.register_payment(&CustomerId::new(id), new).await?;
            table.write_sheet(&views::customers([&customer]))?;
        }
        PaymentCommand::Delete { id, number, yes } => {
            let (customer, _) = service
                .delete_payment(&CustomerId::new(id), number, yes)
                .await?;
            table.write_sheet(&views::customers([&customer]))?;
        }
        PaymentCommand::Due => {
            table.write_sheet(&views::customers(&service.customers_with_balance().await?))?;
        }
        PaymentCommand::Paid => {
            table.write_sheet(&views::customers(&service.customers_with_payments().await?))?;
        }
    }
    Ok(())
}
