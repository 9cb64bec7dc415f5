//! Shine CLI - terminal front end for the shine storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shine catalog list --bucket featured
//! shine catalog search "tire shine"
//!
//! # Manage the cart
//! shine cart add "Premium Car Wax"
//! shine cart qty 1 3
//! shine cart promo SHINE10
//! shine cart checkout
//!
//! # Talk to the shine advisor
//! shine ask "How do I get swirl marks out?"
//! shine chat
//!
//! # Customer account (password is read from stdin)
//! shine account login -e sam@example.com
//! shine account whoami
//! ```
//!
//! Configuration comes from the environment; see `shine_storefront::config`.
//! Logs go to stderr; set `SHINE_LOG_FORMAT=json` for JSON lines.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use shine_storefront::config::StorefrontConfig;
use shine_storefront::error::AppError;
use shine_storefront::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shine")]
#[command(author, version, about = "Shine storefront and product advisor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Ask the shine advisor a single question
    Ask {
        /// What you are looking for
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Start an interactive advisor conversation
    Chat,
    /// Customer account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Fetch the catalog and report its size
    Refresh,
    /// List products
    List {
        /// Display bucket to list
        #[arg(short, long, value_enum, default_value = "all")]
        bucket: Bucket,

        /// Only products of this type
        #[arg(short = 't', long = "type")]
        product_type: Option<String>,
    },
    /// Search products by text
    Search {
        /// Search text
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Bucket {
    All,
    Featured,
    Doorbusters,
    BestSellers,
    NewArrivals,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show lines and totals
    Show,
    /// Add a product by ID or title
    Add {
        /// Product ID (gid or numeric) or title
        product: String,

        /// Variant ID; defaults to the first variant
        #[arg(short, long)]
        variant: Option<String>,
    },
    /// Set a line's quantity (0 removes it)
    Qty {
        /// Line number as shown by `cart show`
        line: usize,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Line number as shown by `cart show`
        line: usize,
    },
    /// Empty the cart
    Clear,
    /// Apply a promo code
    Promo {
        /// Promo code
        code: String,
    },
    /// Print the checkout URL
    Checkout,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Sign in (password read from stdin)
    Login {
        #[arg(short, long)]
        email: String,
    },
    /// Create an account and sign in (password read from stdin)
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Opt in to marketing email
        #[arg(long)]
        accepts_marketing: bool,
    },
    /// Email a password reset link
    Recover {
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in customer
    Whoami,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::info!("Sentry initialized");
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shine_storefront=info,shine_cli=info".into());

    // JSON lines for log collectors, plain text otherwise
    let json_logs = std::env::var("SHINE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        e.report();
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<(), AppError> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Refresh => commands::catalog::refresh(state).await?,
            CatalogAction::List {
                bucket,
                product_type,
            } => commands::catalog::list(state, bucket, product_type.as_deref()).await?,
            CatalogAction::Search { query, limit } => {
                commands::catalog::search(state, &query, limit).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await,
            CartAction::Add { product, variant } => {
                commands::cart::add(state, &product, variant.as_deref()).await?;
            }
            CartAction::Qty { line, quantity } => {
                commands::cart::set_quantity(state, line, quantity).await?;
            }
            CartAction::Remove { line } => commands::cart::remove(state, line).await?,
            CartAction::Clear => commands::cart::clear(state).await,
            CartAction::Promo { code } => commands::cart::promo(state, &code).await,
            CartAction::Checkout => commands::cart::checkout(state).await?,
        },
        Commands::Ask { question } => commands::advisor::ask(state, &question.join(" ")).await?,
        Commands::Chat => commands::advisor::chat(state).await,
        Commands::Account { action } => match action {
            AccountAction::Login { email } => commands::account::login(state, &email).await?,
            AccountAction::Signup {
                email,
                first_name,
                last_name,
                accepts_marketing,
            } => {
                commands::account::signup(state, &email, first_name, last_name, accepts_marketing)
                    .await?;
            }
            AccountAction::Recover { email } => commands::account::recover(state, &email).await?,
            AccountAction::Logout => commands::account::logout(state).await,
            AccountAction::Whoami => commands::account::whoami(state).await?,
        },
    }
    Ok(())
}
