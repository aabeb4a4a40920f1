use chrono::NaiveDate;
use clap::Parser;
use frontdesk::application::engine::{ReservationEngine, Stores};
use frontdesk::application::outbox::NotificationOutbox;
use frontdesk::domain::actor::Actor;
use frontdesk::domain::booking::{Booking, BookingStatus};
use frontdesk::domain::ports::{PropertyStore, PropertyStoreBox, RoomTypeStore, RoomTypeStoreBox};
use frontdesk::domain::room::{NewProperty, NewRoomType};
use frontdesk::error::BookingError;
use frontdesk::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryGuestStore, InMemoryHousekeepingStore, InMemoryPropertyStore,
    InMemoryRoomStore, InMemoryRoomTypeStore,
};
use frontdesk::infrastructure::notifier::LogNotifier;
use frontdesk::interfaces::csv::booking_writer::{self, BookingWriter};
use frontdesk::interfaces::csv::command_reader::{Command, CommandOp, CommandReader};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input front-desk command log (CSV)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Print the end-of-day report for this date instead of the booking ledger
    #[arg(long)]
    report: Option<NaiveDate>,

    /// Staff name stamped on every mutating operation
    #[arg(long, default_value = "Front Desk")]
    actor: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the ledger or the report.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let actor = Actor::new("desk", cli.actor);

    let (stores, properties, room_types) = open_stores(cli.db_path.as_deref()).into_diagnostic()?;
    let outbox = NotificationOutbox::spawn(Box::new(LogNotifier));
    let engine = ReservationEngine::new(stores, outbox);

    // Replay the command log; a bad row is reported and skipped.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for result in reader.commands() {
        match result {
            Ok(command) => {
                if let Err(e) = apply(
                    &engine,
                    properties.as_ref(),
                    room_types.as_ref(),
                    &command,
                    &actor,
                )
                .await
                {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    // Collect final state, drain pending notifications, then print.
    let stdout = io::stdout();
    if let Some(date) = cli.report {
        let report = engine.end_of_day_report(date).await.into_diagnostic()?;
        engine.shutdown().await;
        booking_writer::write_report(stdout.lock(), &report).into_diagnostic()?;
    } else {
        let entries = engine.booking_ledger().await.into_diagnostic()?;
        engine.shutdown().await;
        let mut writer = BookingWriter::new(stdout.lock());
        writer.write_entries(&entries).into_diagnostic()?;
    }

    Ok(())
}

async fn apply(
    engine: &ReservationEngine,
    properties: &dyn PropertyStore,
    room_types: &dyn RoomTypeStore,
    command: &Command,
    actor: &Actor,
) -> frontdesk::error::Result<()> {
    match command.op {
        CommandOp::Create => {
            let request = command.booking_request()?;
            register_room(properties, room_types, &request.room_number).await?;
            engine.create_booking(request, actor).await?;
        }
        CommandOp::CheckIn => {
            let booking = lookup(engine, command).await?;
            engine
                .update_booking_status(&booking.id, BookingStatus::CheckedIn, actor)
                .await?;
        }
        CommandOp::CheckOut => {
            let booking = lookup(engine, command).await?;
            engine
                .update_booking_status(&booking.id, BookingStatus::CheckedOut, actor)
                .await?;
        }
        CommandOp::Cancel => {
            let booking = lookup(engine, command).await?;
            engine
                .update_booking_status(&booking.id, BookingStatus::Cancelled, actor)
                .await?;
        }
        CommandOp::Delete => {
            let booking = lookup(engine, command).await?;
            engine.delete_booking(&booking.id, actor).await?;
        }
        CommandOp::Extend => {
            let booking = lookup(engine, command).await?;
            let new_check_out = command.check_out.ok_or_else(|| {
                BookingError::Validation("command is missing required field check_out".into())
            })?;
            engine.extend_stay(&booking.id, new_check_out, actor).await?;
        }
    }
    Ok(())
}

/// Lifecycle commands address bookings the way desk staff do: by room number
/// and arrival date.
async fn lookup(engine: &ReservationEngine, command: &Command) -> frontdesk::error::Result<Booking> {
    let (room, check_in) = command.stay_key()?;
    engine.find_booking(room, check_in).await?.ok_or_else(|| {
        BookingError::not_found("booking", format!("for room {room} arriving {check_in}"))
    })
}

const DEFAULT_ROOM_TYPE: &str = "Standard";

/// First contact with a room number registers it in the property inventory
/// under the default room type. Known numbers are left alone.
async fn register_room(
    properties: &dyn PropertyStore,
    room_types: &dyn RoomTypeStore,
    number: &str,
) -> frontdesk::error::Result<()> {
    let number = number.trim();
    if number.is_empty() || properties.find_by_number(number).await?.is_some() {
        return Ok(());
    }

    let standard = match room_types.find_by_name(DEFAULT_ROOM_TYPE).await? {
        Some(room_type) => room_type,
        None => {
            let new = NewRoomType {
                name: DEFAULT_ROOM_TYPE.to_string(),
            };
            match room_types.create(new).await {
                Ok(room_type) => room_type,
                Err(e) if e.is_constraint() => room_types
                    .find_by_name(DEFAULT_ROOM_TYPE)
                    .await?
                    .ok_or(e)?,
                Err(e) => return Err(e),
            }
        }
    };

    let new = NewProperty {
        number: number.to_string(),
        room_type_id: Some(standard.id),
        room_type_name: None,
    };
    match properties.create(new).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_constraint() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(
    db_path: Option<&std::path::Path>,
) -> frontdesk::error::Result<(Stores, PropertyStoreBox, RoomTypeStoreBox)> {
    use frontdesk::infrastructure::rocksdb::RocksDbStore;

    match db_path {
        Some(path) => {
            let store = RocksDbStore::open(path)?;
            let stores = Stores {
                guests: Box::new(store.clone()),
                rooms: Box::new(store.clone()),
                bookings: Box::new(store.clone()),
                housekeeping: Box::new(store.clone()),
                properties: Box::new(store.clone()),
                room_types: Box::new(store.clone()),
            };
            Ok((stores, Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(
    db_path: Option<&std::path::Path>,
) -> frontdesk::error::Result<(Stores, PropertyStoreBox, RoomTypeStoreBox)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (Stores, PropertyStoreBox, RoomTypeStoreBox) {
    let properties = InMemoryPropertyStore::new();
    let room_types = InMemoryRoomTypeStore::new();
    let stores = Stores {
        guests: Box::new(InMemoryGuestStore::new()),
        rooms: Box::new(InMemoryRoomStore::new()),
        bookings: Box::new(InMemoryBookingStore::new()),
        housekeeping: Box::new(InMemoryHousekeepingStore::new()),
        properties: Box::new(properties.clone()),
        room_types: Box::new(room_types.clone()),
    };
    (stores, Box::new(properties), Box::new(room_types))
}
