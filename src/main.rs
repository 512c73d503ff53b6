// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EV Finder command line
//!
//! Signs in, runs one station data operation, prints the result and
//! signs out again.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ev_charging_finder::{
    config::Config,
    models::{NewVisit, Station, User, VisitLookup},
    session::Session,
    time_utils::format_utc_rfc3339,
    StationDataClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(name = "ev-finder")]
struct Cli {
    /// Account email
    #[arg(long, env = "EV_FINDER_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "EV_FINDER_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and profile
    Register {
        #[arg(long)]
        username: String,
    },
    /// Show the signed-in user
    Whoami,
    /// List all stations, newest first
    Stations,
    /// Search stations by title
    Search { query: String },
    /// Show a station and its reviews
    Show { station_id: String },
    /// Record a visit to a station
    Visit {
        station_id: String,
        /// Visit time (RFC 3339); defaults to now
        #[arg(long)]
        date: Option<DateTime<Utc>>,
        #[arg(long, default_value = "")]
        review: String,
    },
    /// List your visited stations
    History {
        /// Keep entries whose station lookup succeeded even if others fail
        #[arg(long)]
        partial: bool,
    },
    /// Delete a visited record
    Unvisit { visited_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = Config::from_env().context("Failed to load configuration")?;
    let client = StationDataClient::new(&config).context("Failed to build client")?;

    let email = cli.email.context("--email or EV_FINDER_EMAIL is required")?;
    let password = cli
        .password
        .context("--password or EV_FINDER_PASSWORD is required")?;

    let (session, user) = match &cli.command {
        Commands::Register { username } => {
            let registration = client
                .accounts
                .create_user(&email, &password, username)
                .await?;
            println!("Registered {} ({})", registration.user.username, registration.user.id);
            (registration.session, Some(registration.user))
        }
        _ => {
            let session = client.accounts.sign_in(&email, &password).await?;
            let user = client.accounts.get_current_user(&session).await?;
            (session, user)
        }
    };

    let result = run(&client, &session, user.as_ref(), cli.command).await;

    // Sign out even if the command failed; report the command's error first.
    let signed_out = client.accounts.sign_out(&session).await;
    result?;
    signed_out?;
    Ok(())
}

async fn run(
    client: &StationDataClient,
    session: &Session,
    user: Option<&User>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Register { .. } => {}
        Commands::Whoami => match user {
            Some(user) => println!("{} <{}> ({})", user.username, user.email, user.id),
            None => println!("No profile for this account"),
        },
        Commands::Stations => {
            for station in client.stations.get_all_posts(session).await? {
                print_station_line(&station);
            }
        }
        Commands::Search { query } => {
            let stations = client.stations.search_posts(session, &query).await?;
            if stations.is_empty() {
                println!("No stations match {:?}", query);
            }
            for station in stations {
                print_station_line(&station);
            }
        }
        Commands::Show { station_id } => {
            let (station, reviews) = tokio::try_join!(
                client.stations.get_stations_by_id(session, &station_id),
                client.visits.get_reviews_by_station_id(session, &station_id),
            )?;
            print_station_detail(client, &station);
            println!("Reviews:");
            if reviews.is_empty() {
                println!("  No reviews yet");
            }
            for review in reviews {
                println!(
                    "  {} on {}: {}",
                    review.reviewer_name,
                    review.date.date_naive(),
                    review.review
                );
            }
        }
        Commands::Visit {
            station_id,
            date,
            review,
        } => {
            let user = user.context("Signed-in account has no profile")?;
            let visit = NewVisit {
                user_id: user.id.clone(),
                station_id,
                date: date.unwrap_or_else(Utc::now),
                review,
            };
            let visited = client.visits.mark_visited(session, &visit).await?;
            println!("Marked visited ({})", visited.id);
        }
        Commands::History { partial } => {
            let user = user.context("Signed-in account has no profile")?;
            if partial {
                for lookup in client
                    .visits
                    .get_user_visited_stations_partial(session, &user.id)
                    .await?
                {
                    match lookup {
                        VisitLookup::Found(entry) => print_visit_line(
                            &entry.visited_id,
                            &entry.station.title,
                            entry.visited_date,
                            &entry.visited_review,
                        ),
                        VisitLookup::Failed { visited_id, error } => {
                            println!("{}  <unavailable: {}>", visited_id, error)
                        }
                    }
                }
            } else {
                for entry in client
                    .visits
                    .get_user_visited_stations(session, &user.id)
                    .await?
                {
                    print_visit_line(
                        &entry.visited_id,
                        &entry.station.title,
                        entry.visited_date,
                        &entry.visited_review,
                    );
                }
            }
        }
        Commands::Unvisit { visited_id } => {
            client.visits.remove_visited(session, &visited_id).await?;
            println!("Deleted {}", visited_id);
        }
    }

    Ok(())
}

fn print_station_line(station: &Station) {
    let rating = station
        .rating
        .map(|r| format!("{:.1}/5", r))
        .unwrap_or_else(|| "-".to_string());
    println!("{}  {}  {}", station.id, rating, station.title);
}

fn print_station_detail(client: &StationDataClient, station: &Station) {
    println!("{}", station.title);
    println!("  Location: {:.5}, {:.5}", station.latitude, station.longitude);
    if let Some(address) = &station.address {
        println!("  Address: {}", address);
    }
    if let Some(phone) = &station.phone {
        println!("  Phone: {}", phone);
    }
    if let Some(web) = &station.web {
        println!("  Website: {}", web);
    }
    if let Some(hours) = &station.operating_hours {
        println!("  Operating hours: {}", hours);
    }
    if !station.services.is_empty() {
        println!("  Services: {}", station.services.join(", "));
    }
    if let Some(rating) = station.rating {
        println!("  Rating: {} / 5", rating);
    }
    if let Some(url) = client.stations.thumbnail_url(station) {
        println!("  Thumbnail: {}", url);
    }
}

fn print_visit_line(visited_id: &str, title: &str, date: DateTime<Utc>, review: &str) {
    println!(
        "{}  {}  {}  {}",
        visited_id,
        format_utc_rfc3339(date),
        title,
        review
    );
}

/// Initialize logging to stderr, plain or JSON.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ev_charging_finder=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
