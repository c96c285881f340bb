use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use shopfront::config::{API_URL_ENV, ConfigError, DEFAULT_API_URL};
use shopfront::net::types::{ProductCreate, ProductUpdate, ReviewCreate};
use shopfront::services::auth::{self, AuthError};
use shopfront::storage::FileStorage;
use shopfront::{ApiClient, ApiError, CartError, ClientConfig, Navigation, RouteGuard, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", describe_api_error(.0))]
    Api(#[from] ApiError),
    #[error("sign-in failed: {0}")]
    Auth(#[from] AuthError),
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("not signed in; run `auth login` first")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn describe_api_error(err: &ApiError) -> String {
    match (err.status(), err.detail()) {
        (Some(status), Some(detail)) => format!("server returned HTTP {status}: {detail}"),
        _ => err.to_string(),
    }
}

#[derive(Parser, Debug)]
#[command(name = "shopfront-cli", about = "Storefront API, cart, and route-guard CLI")]
struct Cli {
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// JSON file standing in for browser localStorage.
    #[arg(long, env = "SHOPFRONT_STORAGE", default_value = ".shopfront/storage.json")]
    storage: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Products(ProductsCommand),
    ProductTypes(ProductTypesCommand),
    Reviews(ReviewsCommand),
    Cart(CartCommand),
    /// Evaluate the route guard for a path against the stored session.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Register {
        login: String,
        #[arg(long, env = "SHOPFRONT_PASSWORD")]
        password: String,
    },
    Login {
        login: String,
        #[arg(long, env = "SHOPFRONT_PASSWORD")]
        password: String,
    },
    Me,
    Logout,
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List,
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        type_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: f64,
        #[arg(long, help = "Base64-encoded image")]
        image: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        type_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, help = "Base64-encoded image")]
        image: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ProductTypesCommand {
    #[command(subcommand)]
    command: ProductTypesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductTypesSubcommand {
    List,
    Get { id: i64 },
}

#[derive(Args, Debug)]
struct ReviewsCommand {
    #[command(subcommand)]
    command: ReviewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReviewsSubcommand {
    List,
    Latest,
    Get {
        id: i64,
    },
    Create {
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=5))]
        rating: i32,
        #[arg(long)]
        text: String,
    },
}

#[derive(Args, Debug)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Subcommand, Debug)]
enum CartSubcommand {
    List,
    /// Fetch a product from the API and add it to the cart.
    Add {
        product_id: i64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; zero or less removes the line.
    Update {
        product_id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    Remove {
        product_id: i64,
    },
    Clear,
    Total,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.api_url)?;
    tracing::debug!(api_url = %config.api_url, storage = %cli.storage.display(), "cli configured");
    let storage = Arc::new(FileStorage::new(cli.storage));
    let api = ApiClient::new(&config, storage)?;

    match cli.command {
        Command::Auth(cmd) => run_auth(&api, cmd).await,
        Command::Products(cmd) => run_products(&api, cmd).await,
        Command::ProductTypes(cmd) => run_product_types(&api, cmd).await,
        Command::Reviews(cmd) => run_reviews(&api, cmd).await,
        Command::Cart(cmd) => run_cart(&api, cmd).await,
        Command::Route { path } => run_route(&api, &path),
    }
}

async fn run_auth(api: &ApiClient, auth_cmd: AuthCommand) -> Result<(), CliError> {
    match auth_cmd.command {
        AuthSubcommand::Register { login, password } => {
            let user = auth::register(api, &login, &password).await?;
            print_json(&user)
        }
        AuthSubcommand::Login { login, password } => {
            let user = auth::sign_in(api, &login, &password).await?;
            print_json(&user)
        }
        AuthSubcommand::Me => {
            if !api.session().is_authenticated().map_err(SessionError::from)? {
                return Err(CliError::NotSignedIn);
            }
            let user = api.auth().current_user().await?;
            print_json(&user)
        }
        AuthSubcommand::Logout => {
            auth::sign_out(api)?;
            print_json(&json!({ "ok": true }))
        }
    }
}

async fn run_products(api: &ApiClient, products: ProductsCommand) -> Result<(), CliError> {
    match products.command {
        ProductsSubcommand::List => print_json(&api.products().list().await?),
        ProductsSubcommand::Get { id } => print_json(&api.products().get(id).await?),
        ProductsSubcommand::Create { type_id, name, description, price, image } => {
            let draft = ProductCreate { product_type_id: type_id, name, description, price, image };
            print_json(&api.products().create(&draft).await?)
        }
        ProductsSubcommand::Update { id, type_id, name, description, price, image } => {
            let update = ProductUpdate { product_type_id: type_id, name, description, price, image };
            print_json(&api.products().update(id, &update).await?)
        }
        ProductsSubcommand::Delete { id } => print_json(&api.products().delete(id).await?),
    }
}

async fn run_product_types(api: &ApiClient, types: ProductTypesCommand) -> Result<(), CliError> {
    match types.command {
        ProductTypesSubcommand::List => print_json(&api.product_types().list().await?),
        ProductTypesSubcommand::Get { id } => print_json(&api.product_types().get(id).await?),
    }
}

async fn run_reviews(api: &ApiClient, reviews: ReviewsCommand) -> Result<(), CliError> {
    match reviews.command {
        ReviewsSubcommand::List => print_json(&api.reviews().list().await?),
        ReviewsSubcommand::Latest => print_json(&api.reviews().latest().await?),
        ReviewsSubcommand::Get { id } => print_json(&api.reviews().get(id).await?),
        ReviewsSubcommand::Create { rating, text } => {
            let review = ReviewCreate { rating, text };
            print_json(&api.reviews().create(&review).await?)
        }
    }
}

async fn run_cart(api: &ApiClient, cart_cmd: CartCommand) -> Result<(), CliError> {
    let cart = api.cart();
    match cart_cmd.command {
        CartSubcommand::List => print_json(&cart.get_items()?),
        CartSubcommand::Add { product_id, quantity } => {
            let product = api.products().get(product_id).await?;
            print_json(&cart.add_item(&product, quantity)?)
        }
        CartSubcommand::Update { product_id, quantity } => print_json(&cart.update_quantity(product_id, quantity)?),
        CartSubcommand::Remove { product_id } => print_json(&cart.remove_item(product_id)?),
        CartSubcommand::Clear => print_json(&cart.clear()?),
        CartSubcommand::Total => print_json(&json!({
            "items": cart.item_count()?,
            "total": cart.total()?,
        })),
    }
}

fn run_route(api: &ApiClient, path: &str) -> Result<(), CliError> {
    let guard = RouteGuard::new(api.session());
    let outcome = match guard.navigate(path) {
        Navigation::Allow => json!({ "path": path, "navigation": "allow" }),
        Navigation::Redirect(to) => json!({ "path": path, "navigation": "redirect", "to": to }),
    };
    print_json(&outcome)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
