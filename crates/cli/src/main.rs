//! Command line front end for herbarium specimen search.
//!
//! Usage:
//!     herbarium search "nymphaea lotus"
//!     herbarium search Quercus --local
//!     herbarium suggest "white sa"
//!     herbarium identify leaf.jpg flower.jpg
//!     herbarium models --filter oak
//!     herbarium prefs --local-search true
//!     herbarium health

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use herbarium_explain::{render_autocomplete, render_report, render_suggestions};
use herbarium_inventory::Inventory;
use herbarium_model::SearchScope;
use herbarium_pipeline::{
    Autocomplete, AutocompleteConfig, Identifier, IdentifyConfig, PipelineConfig, SpecimenPipeline,
};
use herbarium_prefs::{JsonFileStore, UserPreferences};
use herbarium_providers::{
    GbifClient, INaturalistClient, PlantIdClient, ProviderConfig, WikipediaClient,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "herbarium")]
#[command(about = "Search, suggest and identify herbarium specimens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GBIF API root
    #[arg(long, env = "HERBARIUM_GBIF_URL", default_value = "https://api.gbif.org/v1")]
    gbif_url: String,

    /// Wikipedia REST API root
    #[arg(
        long,
        env = "HERBARIUM_WIKIPEDIA_URL",
        default_value = "https://en.wikipedia.org/api/rest_v1"
    )]
    wikipedia_url: String,

    /// iNaturalist API root
    #[arg(
        long,
        env = "HERBARIUM_INATURALIST_URL",
        default_value = "https://api.inaturalist.org/v1"
    )]
    inaturalist_url: String,

    /// Plant.id API root
    #[arg(long, env = "HERBARIUM_PLANT_ID_URL", default_value = "https://api.plant.id/v2")]
    plant_id_url: String,

    /// Plant.id API key
    #[arg(long, env = "PLANT_ID_API_KEY", hide_env_values = true)]
    plant_id_key: Option<String>,

    /// Preference file
    #[arg(long, env = "HERBARIUM_PREFS", default_value = "herbarium-prefs.json")]
    prefs: PathBuf,

    /// Inventory JSON file (defaults to the bundled inventory)
    #[arg(long, env = "HERBARIUM_INVENTORY")]
    inventory: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a genus, species or common name
    Search {
        /// Term to search
        term: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Suggest names for a partial query
    Suggest {
        query: String,

        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Identify a plant from one or more photos
    Identify {
        /// Image files
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List 3D models in the local catalog
    Models {
        /// Only models whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Remember this model as selected
        #[arg(long)]
        select: Option<String>,
    },

    /// Show or change stored preferences
    Prefs {
        /// Restrict searches to the local inventory
        #[arg(long)]
        local_search: Option<bool>,
    },

    /// Check that the taxonomy service is reachable
    Health,
}

#[derive(Args)]
struct ScopeArgs {
    /// Search the local inventory only
    #[arg(long, conflicts_with = "global")]
    local: bool,

    /// Search the full reference database
    #[arg(long)]
    global: bool,
}

impl ScopeArgs {
    /// Explicit flag, if one was given.
    fn requested(&self) -> Option<SearchScope> {
        if self.local {
            Some(SearchScope::Local)
        } else if self.global {
            Some(SearchScope::Global)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "herbarium=debug"
    } else {
        "herbarium=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ProviderConfig {
        gbif_url: cli.gbif_url.clone(),
        wikipedia_url: cli.wikipedia_url.clone(),
        inaturalist_url: cli.inaturalist_url.clone(),
        plant_id_url: cli.plant_id_url.clone(),
        plant_id_api_key: cli.plant_id_key.clone(),
        ..Default::default()
    };

    let inventory = match &cli.inventory {
        Some(path) => Inventory::load(path)?,
        None => Inventory::builtin()?,
    };

    let store = JsonFileStore::open(&cli.prefs)
        .with_context(|| format!("Failed to open preferences at {}", cli.prefs.display()))?;
    let mut prefs = UserPreferences::load(store);

    match cli.command {
        Commands::Search {
            term,
            scope,
            format,
        } => {
            run_search(&config, inventory, &mut prefs, &term, &scope, format).await?;
        }
        Commands::Suggest {
            query,
            scope,
            format,
        } => {
            run_suggest(&config, inventory, &prefs, &query, &scope, format).await?;
        }
        Commands::Identify { images, format } => {
            run_identify(&config, inventory, &images, format).await?;
        }
        Commands::Models { filter, select } => {
            run_models(&inventory, &mut prefs, filter.as_deref(), select.as_deref())?;
        }
        Commands::Prefs { local_search } => {
            run_prefs(&mut prefs, local_search)?;
        }
        Commands::Health => {
            run_health(&config, inventory).await?;
        }
    }

    Ok(())
}

async fn run_search(
    config: &ProviderConfig,
    inventory: Inventory,
    prefs: &mut UserPreferences<JsonFileStore>,
    term: &str,
    scope_args: &ScopeArgs,
    format: OutputFormat,
) -> Result<()> {
    let scope = match scope_args.requested() {
        Some(scope) => {
            prefs.set_local_search(scope.is_local())?;
            scope
        }
        None => prefs.scope(),
    };
    tracing::debug!(
        term = %term,
        scope = scope.label(),
        prefs = %prefs.store().path().display(),
        "Starting search"
    );

    let pipeline = SpecimenPipeline::new(
        GbifClient::new(config)?,
        WikipediaClient::new(config)?,
        inventory,
        PipelineConfig::default(),
    );

    let report = pipeline.search(term, scope).await;
    prefs.select_specimen(term)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Searching for: {} ({})", term, scope.label());
            println!("---");
            print!("{}", render_report(&report));
        }
    }

    Ok(())
}

async fn run_suggest(
    config: &ProviderConfig,
    inventory: Inventory,
    prefs: &UserPreferences<JsonFileStore>,
    query: &str,
    scope_args: &ScopeArgs,
    format: OutputFormat,
) -> Result<()> {
    let scope = scope_args.requested().unwrap_or_else(|| prefs.scope());
    let autocomplete = Autocomplete::new(
        INaturalistClient::new(config)?,
        inventory,
        AutocompleteConfig::default(),
    );

    let suggestions = autocomplete.suggest(query, scope).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        OutputFormat::Text => print!("{}", render_autocomplete(&suggestions)),
    }

    Ok(())
}

async fn run_identify(
    config: &ProviderConfig,
    inventory: Inventory,
    paths: &[PathBuf],
    format: OutputFormat,
) -> Result<()> {
    let images = paths
        .iter()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let identifier = Identifier::new(
        PlantIdClient::new(config)?,
        inventory,
        IdentifyConfig::default(),
    );
    let suggestions = identifier.identify(&images).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        OutputFormat::Text => print!("{}", render_suggestions(&suggestions)),
    }

    Ok(())
}

fn run_models(
    inventory: &Inventory,
    prefs: &mut UserPreferences<JsonFileStore>,
    filter: Option<&str>,
    select: Option<&str>,
) -> Result<()> {
    if let Some(name) = select {
        let Some(species) = inventory.species_for_model(name) else {
            bail!("Unknown model: {}", name);
        };
        prefs.select_model(name)?;
        println!("Selected {} ({})", name, species);
        return Ok(());
    }

    let models = inventory.filter_models(filter.unwrap_or_default());
    for model in &models {
        let marker = if prefs.model().is_some_and(|m| m.eq_ignore_ascii_case(model)) {
            "*"
        } else {
            " "
        };
        let species = inventory.species_for_model(model).unwrap_or_default();
        println!("{} {} ({})", marker, model, species);
    }
    println!("---");
    println!("Total: {} models", models.len());

    Ok(())
}

fn run_prefs(prefs: &mut UserPreferences<JsonFileStore>, local_search: Option<bool>) -> Result<()> {
    if let Some(local) = local_search {
        prefs.set_local_search(local)?;
    }

    println!("Preferences: {}", prefs.store().path().display());
    println!("  model:              {}", prefs.model().unwrap_or("-"));
    println!("  specimen:           {}", prefs.specimen().unwrap_or("-"));
    println!("  localSearchChecked: {}", prefs.local_search());

    Ok(())
}

async fn run_health(config: &ProviderConfig, inventory: Inventory) -> Result<()> {
    let pipeline = SpecimenPipeline::new(
        GbifClient::new(config)?,
        WikipediaClient::new(config)?,
        inventory,
        PipelineConfig::default(),
    );

    print!("Checking {} taxonomy... ", pipeline.taxonomy_name());

    match pipeline.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
