//! MediCart CLI - browse medicines, manage the cart, and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! medicart products --featured
//! medicart products --search napa
//!
//! # Cart
//! medicart cart add 1
//! medicart cart update 1 3
//! medicart cart
//!
//! # Account and checkout
//! medicart login -e rahim@example.com -p secret
//! medicart checkout --address "Mirpur, Dhaka"
//! medicart orders
//!
//! # Assistant
//! medicart chat what are your opening hours
//! ```
//!
//! State (cart and login) is kept in the file named by `MEDICART_STORE_PATH`.
//!
//! # Environment Variables
//!
//! - `MEDICART_LOG_FORMAT` - `json` for JSON log lines on stderr
//! - `RUST_LOG` - log filter (default: `medicart_client=info,medicart_cli=info`)
//!
//! See `medicart_client::config` for the rest.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medicart_client::MediCart;
use medicart_client::api::MedicineQuery;
use medicart_client::config::ClientConfig;
use medicart_core::ConsultationCategory;

#[allow(clippy::print_stdout)]
mod commands;

#[derive(Parser)]
#[command(name = "medicart")]
#[command(author, version, about = "MediCart pharmacy from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List medicines
    Products {
        /// Only featured medicines
        #[arg(long, conflicts_with_all = ["search", "category"])]
        featured: bool,

        /// Name search
        #[arg(short, long)]
        search: Option<String>,

        /// Category filter (e.g. tablet, syrup)
        #[arg(short, long)]
        category: Option<String>,

        /// Number of results to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one medicine
    Product {
        /// Medicine id
        id: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Log in
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Delivery address
        #[arg(long)]
        address: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Order everything in the cart
    Checkout {
        /// Shipping address (default: the address on your profile)
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List your orders, or show one
    Orders {
        /// Order id
        id: Option<String>,
    },
    /// Ask a pharmacist
    Consult {
        /// Your question
        question: String,

        /// Topic (general, medication, side-effects, interactions, emergency)
        #[arg(short, long, default_value = "general")]
        category: ConsultationCategory,
    },
    /// List your consultations
    Consultations,
    /// Talk to the assistant
    Chat {
        /// Page to report as the current one
        #[arg(long)]
        page: Option<String>,

        /// Message
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Check that the MediCart API is up
    Health,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a medicine
    Add {
        /// Medicine id
        id: String,
    },
    /// Set a quantity (0 or less removes the line)
    Update {
        /// Medicine id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a medicine
    Remove {
        /// Medicine id
        id: String,
    },
    /// Remove everything
    Clear,
}

fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medicart_client=info,medicart_cli=info".into());

    let json = std::env::var("MEDICART_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let (text_layer, json_layer) = if json {
        (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `from_env` loads `.env` itself.
    let config = ClientConfig::from_env();

    // Sentry must be up before the subscriber so the layer has a client.
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let mut app = match MediCart::open(config) {
        Ok(app) => app,
        Err(e) => {
            e.report();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &mut app).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, app: &mut MediCart) -> commands::Result<()> {
    match cli.command {
        Commands::Products {
            featured,
            search,
            category,
            skip,
            limit,
        } => {
            let query = MedicineQuery {
                skip,
                limit,
                category,
                search,
            };
            commands::catalog::list(app, featured, query).await?;
        }
        Commands::Product { id } => commands::catalog::show(app, &id).await?,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(app),
            CartAction::Add { id } => commands::cart::add(app, &id).await?,
            CartAction::Update { id, quantity } => commands::cart::update(app, &id, quantity),
            CartAction::Remove { id } => commands::cart::remove(app, &id),
            CartAction::Clear => commands::cart::clear(app),
        },
        Commands::Login { email, password } => {
            commands::account::login(app, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            phone,
            address,
        } => {
            let account = commands::account::NewAccount {
                name,
                email,
                password,
                phone,
                address,
            };
            commands::account::register(app, account).await?;
        }
        Commands::Logout => commands::account::logout(app),
        Commands::Whoami => commands::account::whoami(app),
        Commands::Checkout { address } => {
            commands::orders::checkout(app, address.as_deref()).await?;
        }
        Commands::Orders { id } => commands::orders::orders(app, id.as_deref()).await?,
        Commands::Consult { question, category } => {
            commands::orders::consult(app, &question, category).await?;
        }
        Commands::Consultations => commands::orders::consultations(app).await?,
        Commands::Chat { page, message } => {
            commands::chat::chat(app, &message.join(" "), page).await;
        }
        Commands::Health => {
            let health = app.api().health().await?;
            #[allow(clippy::print_stdout)]
            {
                println!(
                    "{} {} {}",
                    health.service.as_deref().unwrap_or("MediCart API"),
                    health.version.as_deref().unwrap_or(""),
                    health.status
                );
            }
        }
    }
    Ok(())
}
