#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the incidence map.
//!
//! Runs the incidence manager against a file-backed store and a headless
//! map, so the collection can be listed, filtered, extended and pruned
//! from a terminal. Every invocation hydrates the collection, attaches
//! the map (placing one marker per incidence) and then runs one command.

mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use incidence_map_geocoder::{NominatimGeocoder, OfflineGeocoder, ReverseGeocoder, service_registry};
use incidence_map_incidence_models::{
    Coords, DetailInput, IncidenceId, IncidenceKind, TrashType, UrgencyLevel,
};
use incidence_map_list::ListFilter;
use incidence_map_manager::{IncidenceManager, ManagerConfig, NewIncidence};
use incidence_map_map::HeadlessMap;
use incidence_map_store::FileBlobStore;

type Manager = IncidenceManager<FileBlobStore, HeadlessMap>;

/// Report and browse geotagged incidences.
#[derive(Parser)]
#[command(name = "incidence_map")]
#[command(about = "Report and browse geotagged incidences")]
struct Cli {
    /// Directory holding the persisted collection.
    #[arg(long, env = "INCIDENCE_MAP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// TOML file overriding the default manager configuration.
    #[arg(long, env = "INCIDENCE_MAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of the incidence list.
    List {
        /// Page to show (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Only show incidences of this type.
        #[arg(long = "type", conflicts_with = "urgency")]
        kind: Option<IncidenceKind>,

        /// Only show incidences with exactly this urgency (1-5).
        #[arg(long)]
        urgency: Option<u8>,

        /// Print the page as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report a new incidence.
    Add {
        #[arg(long)]
        kind: IncidenceKind,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Urgency from 1 (minimal) to 5 (critical).
        #[arg(long)]
        urgency: i64,

        #[arg(long)]
        description: String,

        /// Affected surface in m² (infrastructure).
        #[arg(long)]
        surface: Option<f64>,

        /// Trash category (maintenance), e.g. "plastic" or "bulky".
        #[arg(long)]
        trash_type: Option<String>,

        /// Skip the reverse geocoding lookup.
        #[arg(long)]
        no_geocode: bool,
    },

    /// Delete an incidence by id.
    Delete { id: String },

    /// Print the list page holding an incidence.
    Locate {
        id: String,

        #[arg(long = "type", conflicts_with = "urgency")]
        kind: Option<IncidenceKind>,

        #[arg(long)]
        urgency: Option<u8>,
    },

    /// Delete every incidence.
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };
    let mut manager = open_manager(cli.data_dir, config);

    match cli.command {
        Commands::List {
            page,
            kind,
            urgency,
            json,
        } => cmd_list(&mut manager, page, list_filter(kind, urgency)?, json)?,
        Commands::Add {
            kind,
            lat,
            lng,
            urgency,
            description,
            surface,
            trash_type,
            no_geocode,
        } => {
            let detail = detail_input(kind, surface, trash_type)?;
            let input = NewIncidence {
                coords: Coords::new(lat, lng),
                urgency_level: urgency,
                description,
                detail,
            };
            cmd_add(&mut manager, input, no_geocode).await?;
        }
        Commands::Delete { id } => cmd_delete(&mut manager, &IncidenceId::parse(&id)?),
        Commands::Locate { id, kind, urgency } => {
            manager.apply_filter(list_filter(kind, urgency)?);
            cmd_locate(&manager, &IncidenceId::parse(&id)?);
        }
        Commands::Reset => {
            manager.reset();
            println!("Cleared all incidences.");
        }
    }

    Ok(())
}

/// Opens the store under `data_dir`, hydrates and attaches a headless map.
fn open_manager(data_dir: PathBuf, config: ManagerConfig) -> Manager {
    log::debug!("Using data directory {}", data_dir.display());
    let mut manager = IncidenceManager::new(FileBlobStore::new(data_dir), config);
    manager.hydrate();
    manager.attach_map(HeadlessMap::new(), None);
    manager
}

fn list_filter(
    kind: Option<IncidenceKind>,
    urgency: Option<u8>,
) -> Result<ListFilter, Box<dyn std::error::Error>> {
    Ok(match (kind, urgency) {
        (Some(kind), _) => ListFilter::Type(kind),
        (None, Some(level)) => ListFilter::Urgency(UrgencyLevel::from_value(level)?),
        (None, None) => ListFilter::All,
    })
}

fn detail_input(
    kind: IncidenceKind,
    surface: Option<f64>,
    trash_type: Option<String>,
) -> Result<DetailInput, Box<dyn std::error::Error>> {
    match kind {
        IncidenceKind::Infrastructure => surface
            .map(|surface| DetailInput::Infrastructure { surface })
            .ok_or_else(|| "--surface is required for infrastructure incidences".into()),
        IncidenceKind::Maintenance => trash_type
            .map(|trash_type| DetailInput::Maintenance { trash_type })
            .ok_or_else(|| {
                let names: Vec<String> = TrashType::all().iter().map(ToString::to_string).collect();
                format!(
                    "--trash-type is required for maintenance incidences (one of: {})",
                    names.join(", ")
                )
                .into()
            }),
    }
}

fn cmd_list(
    manager: &mut Manager,
    page: usize,
    filter: ListFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    manager.apply_filter(filter);
    manager.go_to_page(page);
    let view = manager.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render::print_list(&view);
    }
    Ok(())
}

async fn cmd_add(
    manager: &mut Manager,
    input: NewIncidence,
    no_geocode: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = service_registry::nominatim();
    let geocoder: Box<dyn ReverseGeocoder> = if no_geocode || !service.enabled {
        Box::new(OfflineGeocoder)
    } else {
        Box::new(NominatimGeocoder::from_service(&service)?)
    };

    let incidence = manager.create(input, geocoder.as_ref()).await?;

    println!("Created {} ({})", incidence.display_label(), incidence.id());
    println!("  detail:  {}", incidence.detail_value());
    println!(
        "  address: {}",
        incidence.address().unwrap_or("(not resolved)")
    );
    println!("{} incidence(s) stored", manager.len());
    Ok(())
}

fn cmd_delete(manager: &mut Manager, id: &IncidenceId) {
    if manager.delete(id) {
        println!("Deleted incidence {id}. {} remaining.", manager.len());
    } else {
        println!("No incidence with id {id}.");
    }
}

fn cmd_locate(manager: &Manager, id: &IncidenceId) {
    match manager.locate_page(id) {
        Some(page) => println!(
            "Incidence {id} is on page {page} of {}.",
            manager.view().total_pages
        ),
        None if manager.get(id).is_some() => {
            println!("Incidence {id} is hidden by the {:?} filter.", manager.filter());
        }
        None => println!("No incidence with id {id}."),
    }
}
