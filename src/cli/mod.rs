use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;

#[derive(Parser)]
#[command(name = "careflow")]
#[command(about = "Patient appointment booking and emergency dispatch")]
#[command(long_about = "careflow walks a patient through booking a hospital appointment \
                       (facility, department, date, time slot) and runs the emergency SOS flow \
                       with ambulance ETA, contact notification and auto-timeout. Get started with \
                       'careflow catalog' to see the available hospitals.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    Facilities,
    Departments,
    Slots,
}

/// Ordering for the facility listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FacilitySort {
    /// Order the catalog was seeded in
    #[default]
    Catalog,
    /// Nearest first
    Distance,
    /// Most free beds first
    Availability,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List hospitals, departments or appointment time slots
    Catalog {
        /// Which listing to show
        #[arg(value_enum, default_value = "facilities")]
        kind: CatalogKind,
        /// Print the listing as JSON
        #[arg(long, help = "Print the listing as JSON")]
        json: bool,
        /// Ordering of the facility listing
        #[arg(long, value_enum, default_value = "catalog", help = "Sort facilities by catalog order, distance or free beds")]
        sort: FacilitySort,
    },
    /// Show the dates the appointment calendar offers
    Calendar {
        /// Number of days ahead to scan (defaults to booking.horizon_days)
        #[arg(long, help = "Days ahead to scan for selectable dates")]
        days: Option<u32>,
    },
    /// Book an appointment for the signed-in patient
    Book {
        /// Facility id, e.g. h1
        #[arg(long, help = "Facility id from 'careflow catalog facilities'")]
        facility: String,
        /// Department id, e.g. d2
        #[arg(long, help = "Department id from 'careflow catalog departments'")]
        department: String,
        /// Appointment date; first selectable date when omitted
        #[arg(long, help = "Appointment date as YYYY-MM-DD")]
        date: Option<NaiveDate>,
        /// Time slot id; first slot of the day when omitted
        #[arg(long, help = "Time slot id from 'careflow catalog slots'")]
        slot: Option<String>,
        /// Print the confirmed booking as JSON
        #[arg(long, help = "Print the confirmed booking as JSON")]
        json: bool,
    },
    /// Raise an emergency SOS and follow it until it resolves
    Emergency {
        /// Cancel at the confirmation prompt instead of confirming
        #[arg(long, help = "Cancel instead of confirming the alert")]
        cancel: bool,
        /// Close the alert after this many seconds instead of waiting for the auto-timeout
        #[arg(long, help = "Seconds before closing the alert manually")]
        close_after: Option<u64>,
        /// Print dispatch status as JSON
        #[arg(long, help = "Print dispatch status as JSON")]
        json: bool,
    },
    /// Show the signed-in patient's profile
    Profile {
        /// Print the profile as JSON
        #[arg(long, help = "Print the profile as JSON")]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}
