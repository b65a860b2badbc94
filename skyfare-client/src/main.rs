use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use skyfare_client::{ApiClient, ClientError, FileSessionStore, SearchForm, DEFAULT_API_URL};
use skyfare_core::{Flight, NewFlight, ProfilePatch, Sensitive};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Search flights and manage your account from the terminal.
#[derive(Debug, Parser)]
#[command(name = "skyfare", version, about, long_about = None)]
struct Args {
    /// Base URL of the API.
    #[arg(long, env = "SKYFARE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Where the session token is kept between runs.
    #[arg(long, env = "SKYFARE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and log in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKYFARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKYFARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Profile,
    /// Change name, email or password.
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Search flights by route prefix and day.
    Search {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Departure day, YYYY-MM-DD (UTC).
        #[arg(long)]
        date: String,
        #[arg(long, default_value_t = 1)]
        passengers: u32,
    },
    /// Show one flight.
    Show { id: String },
    /// Pick a flight to book. Requires login.
    Select { id: String },
    /// Publish a new flight. Requires login.
    CreateFlight {
        #[arg(long)]
        airline: String,
        #[arg(long)]
        flight_number: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// RFC 3339 timestamp.
        #[arg(long)]
        departure: DateTime<Utc>,
        /// RFC 3339 timestamp.
        #[arg(long)]
        arrival: DateTime<Utc>,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        currency: Option<String>,
    },
}

fn default_session_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".skyfare").join("session.json"),
        None => PathBuf::from(".skyfare-session.json"),
    }
}

fn print_flights(flights: &[Flight]) {
    if flights.is_empty() {
        println!("No flights found.");
        return;
    }
    println!(
        "{:<36}  {:<10} {:<8} {:<12} {:<12} {:<17} {:<8} {:>10}",
        "ID", "AIRLINE", "FLIGHT", "FROM", "TO", "DEPARTS (UTC)", "DURATION", "PRICE"
    );
    for f in flights {
        println!(
            "{:<36}  {:<10} {:<8} {:<12} {:<12} {:<17} {:<8} {:>6} {}",
            f.id,
            f.airline,
            f.flight_number,
            f.departure_airport,
            f.arrival_airport,
            f.departure_time.format("%Y-%m-%d %H:%M"),
            f.duration,
            f.price,
            f.currency
        );
    }
}

fn print_flight(f: &Flight) {
    println!("{} {} ({})", f.airline, f.flight_number, f.id);
    println!("  {} -> {}", f.departure_airport, f.arrival_airport);
    println!("  departs  {}", f.departure_time.to_rfc3339());
    println!("  arrives  {}", f.arrival_time.to_rfc3339());
    println!("  duration {}", f.duration);
    println!("  price    {} {}", f.price, f.currency);
}

async fn run(client: &ApiClient, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Register { name, email, password } => {
            let user = client.register(&name, &email, &Sensitive::new(password)).await?;
            eprintln!("Registered successfully as {} <{}>", user.name, user.email);
        }
        Command::Login { email, password } => {
            let user = client.login(&email, &Sensitive::new(password)).await?;
            eprintln!("Logged in successfully as {}", user.name);
        }
        Command::Logout => {
            client.logout()?;
            eprintln!("Logged out");
        }
        Command::Profile => {
            let user = client.current_user().await?;
            println!("{} <{}> ({})", user.name, user.email, user.id);
        }
        Command::UpdateProfile { name, email, password } => {
            let patch = ProfilePatch {
                name,
                email,
                password: password.map(Sensitive::new),
            };
            let user = client.update_profile(&patch).await?;
            eprintln!("Profile updated: {} <{}>", user.name, user.email);
        }
        Command::Search { from, to, date, passengers } => {
            let form = SearchForm { from, to, date, passengers };
            print_flights(&client.search_flights(&form).await?);
        }
        Command::Show { id } => print_flight(&client.get_flight(&id).await?),
        Command::Select { id } => {
            let flight = match client.select_flight(&id).await {
                Err(ClientError::LoginRequired) => {
                    eprintln!("Please login to book this flight");
                    return Err(ClientError::LoginRequired);
                }
                other => other?,
            };
            eprintln!("Selected flight: {} {}", flight.airline, flight.flight_number);
            print_flight(&flight);
        }
        Command::CreateFlight {
            airline,
            flight_number,
            from,
            to,
            departure,
            arrival,
            price,
            currency,
        } => {
            let record = NewFlight {
                airline: Some(airline),
                flight_number: Some(flight_number),
                departure_airport: Some(from),
                arrival_airport: Some(to),
                departure_time: Some(departure),
                arrival_time: Some(arrival),
                price: Some(price),
                currency,
            };
            let flight = client.create_flight(&record).await?;
            eprintln!("Flight created");
            print_flight(&flight);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare=warn,skyfare_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let session_file = args.session_file.unwrap_or_else(default_session_file);
    let client = ApiClient::new(&args.api_url, Arc::new(FileSessionStore::new(session_file)));

    match run(&client, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::LoginRequired) => {
            eprintln!("Not logged in. Run `skyfare login --email <EMAIL>` first.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
