//! Laptop Store CLI
//!
//! Terminal storefront for the laptop store backend:
//! - Browse, filter and inspect laptops
//! - Log in, register, view the profile
//! - Manage inventory as an admin
//! - Chat with the shopping assistant

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use laptop_store::catalog::FEATURED_LIMIT;
use laptop_store::chat::CURSOR;
use laptop_store::config::generate_default_config;
use laptop_store::views::{self, ListingQuery, Loadable, DELETE_CONFIRMATION, DETAIL_ERROR};
use laptop_store::{
    ChatWidget, Config, DraftField, FileTokenStore, FormMode, GeminiAssistant, LaptopDraft,
    LaptopFilter, LoggingConfig, LoginCredentials, RegisterPayload, Role, SendOutcome, Session,
    StoreClient, TokenStore,
};

#[derive(Parser)]
#[command(name = "laptop-store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Laptop Store Deluxe in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the user config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API base URL, overriding the config
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the home page with featured laptops
    Home,

    /// Browse laptops with optional filters
    Laptops {
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        price_min: Option<f64>,
        #[arg(long)]
        price_max: Option<f64>,
        #[arg(long)]
        ram: Option<String>,
        #[arg(long)]
        storage: Option<String>,
        /// Minimum rating (1-5)
        #[arg(long)]
        rating_min: Option<f64>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show one laptop's details
    Show {
        /// Laptop ID
        id: String,
    },

    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show the logged-in user's profile
    Profile,

    /// Forget the stored session
    Logout,

    /// Manage inventory (admin only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Chat with the shopping assistant
    Chat,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List inventory
    List {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Add a laptop
    Create {
        /// Field values as field=value (e.g. model="XPS 13", tags="gaming, student")
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Edit a laptop
    Edit {
        id: String,
        /// Field values as field=value
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Delete a laptop
    Delete {
        id: String,
        /// Listing page the laptop is on
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load_default().context("Failed to load config")?,
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.session.token_path()));
    let client = StoreClient::new(&config.api, tokens).context("Failed to create API client")?;
    let mut session = Session::new(client);

    if let Err(e) = run(cli.command, &config, &mut session).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    // Logs go to stderr; stdout carries the rendered pages
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("laptop_store={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Commands, config: &Config, session: &mut Session) -> anyhow::Result<()> {
    match command {
        Commands::Home => {
            let filter = LaptopFilter::new().page(1).limit(FEATURED_LIMIT);
            let state = views::load(&mut std::io::stderr(), views::render_featured, async {
                Loadable::from_result(
                    session.client().list_laptops(&filter).await.map(|page| page.data),
                )
            })
            .await;
            emit(state, views::render_featured)
        }

        Commands::Laptops {
            brand,
            price_min,
            price_max,
            ram,
            storage,
            rating_min,
            tags,
            page,
        } => {
            let mut query = ListingQuery::new(config.api.page_limit);
            query.set_filter(LaptopFilter {
                brand,
                price_min,
                price_max,
                ram,
                storage,
                rating_min,
                tags,
                ..LaptopFilter::default()
            });
            query.go_to(page);

            let state = views::load(&mut std::io::stderr(), views::render_listing, async {
                Loadable::from_result(session.client().list_laptops(&query.request()).await)
            })
            .await;
            emit(state, views::render_listing)
        }

        Commands::Show { id } => {
            let state = views::load(&mut std::io::stderr(), views::render_detail, async {
                Loadable::from_result_or(session.client().get_laptop(&id).await, DETAIL_ERROR)
            })
            .await;
            emit(state, views::render_detail)
        }

        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            let user = session.login(&LoginCredentials { email, password }).await?;
            println!("Logged in successfully! Welcome, {}.", user.username);
            Ok(())
        }

        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            session
                .register(&RegisterPayload {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Registration successful! Please log in.");
            Ok(())
        }

        Commands::Profile => {
            session.restore().await;
            let user = session.require_user()?;
            println!("{}", views::render_profile(user));
            Ok(())
        }

        Commands::Logout => {
            session.logout();
            println!("Logged out successfully.");
            Ok(())
        }

        Commands::Admin { command } => {
            session.restore().await;
            session.require_role(Role::Admin)?;
            run_admin(command, config, session.client()).await
        }

        Commands::Chat => run_chat(config).await,

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)?;
                        }
                    }
                    std::fs::write(&path, &content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
            Ok(())
        }
    }
}

async fn run_admin(command: AdminCommand, config: &Config, client: &StoreClient) -> anyhow::Result<()> {
    let listing = |page: u32| LaptopFilter::new().page(page).limit(config.api.page_limit);

    match command {
        AdminCommand::List { page } => {
            let state = views::load(&mut std::io::stderr(), views::render_admin_table, async {
                Loadable::from_result(client.list_laptops(&listing(page)).await)
            })
            .await;
            emit(state, views::render_admin_table)
        }

        AdminCommand::Create { fields } => {
            let mut draft = LaptopDraft::new();
            apply_fields(&mut draft, &fields)?;

            match draft.submit(client, &FormMode::Create).await {
                Ok(created) => {
                    match created {
                        Some(laptop) => println!("Laptop added successfully! ({})", laptop.id),
                        None => println!("Laptop added successfully!"),
                    }
                    Ok(())
                }
                Err(e) => bail!("{}", e.validation_summary()),
            }
        }

        AdminCommand::Edit { id, fields } => {
            let laptop = client
                .get_laptop(&id)
                .await
                .context("Failed to load laptop data")?;
            let mut draft = LaptopDraft::from_laptop(&laptop);
            apply_fields(&mut draft, &fields)?;

            match draft.submit(client, &FormMode::Edit(id)).await {
                Ok(_) => {
                    println!("Laptop updated successfully!");
                    Ok(())
                }
                Err(e) => bail!("{}", e.validation_summary()),
            }
        }

        AdminCommand::Delete { id, page, yes } => {
            if !yes {
                let answer = prompt(&format!("{} [y/N] ", DELETE_CONFIRMATION))?;
                if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let rows_on_page = count_rows(client, &listing(page)).await;

            client.delete_laptop(&id).await?;
            println!("Laptop deleted successfully!");

            let next_page = views::page_after_delete(page, rows_on_page);
            let state = views::load(&mut std::io::stderr(), views::render_admin_table, async {
                Loadable::from_result(client.list_laptops(&listing(next_page)).await)
            })
            .await;
            emit(state, views::render_admin_table)
        }
    }
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let assistant = GeminiAssistant::new(&config.assistant).context("Failed to create assistant")?;
    let mut widget = ChatWidget::new(Arc::new(assistant));
    widget.open();

    println!("{}", views::render_transcript(widget.messages(), None));
    if let Some(error) = widget.error() {
        bail!("{}", error);
    }
    println!("(type /quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        let mut printed = 0;
        let outcome = widget
            .send(&line, |message| {
                let text = message.text.strip_suffix(CURSOR).unwrap_or(&message.text);
                if let Some(fresh) = text.get(printed..) {
                    if !fresh.is_empty() {
                        if printed == 0 {
                            print!("Assistant: ");
                        }
                        print!("{}", fresh);
                        printed = text.len();
                        let _ = std::io::stdout().flush();
                    }
                }
            })
            .await;

        match outcome {
            SendOutcome::Ignored => {}
            SendOutcome::Completed => println!(),
            SendOutcome::Failed(details) => {
                if printed > 0 {
                    println!();
                }
                tracing::debug!("Assistant failure: {}", details);
                if let Some(reply) = widget.messages().last() {
                    println!("{}", views::render_message(reply));
                }
            }
        }
    }

    widget.close();
    Ok(())
}

/// Rows on a listing page; 0 when the page cannot be fetched
async fn count_rows(client: &StoreClient, filter: &LaptopFilter) -> usize {
    match client.list_laptops(filter).await {
        Ok(current) => current.data.len(),
        Err(e) => {
            tracing::warn!(page = ?filter.page, error = %e, "Could not count rows before delete");
            0
        }
    }
}

/// Print a loaded page, or turn its failure into the command's error
fn emit<T>(state: Loadable<T>, render: impl FnOnce(&Loadable<T>) -> String) -> anyhow::Result<()> {
    if let Loadable::Failed(message) = &state {
        bail!("{}", message);
    }
    println!("{}", render(&state));
    Ok(())
}

fn apply_fields(draft: &mut LaptopDraft, fields: &[String]) -> anyhow::Result<()> {
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("Expected FIELD=VALUE, got {:?}", field))?;
        let name: DraftField = name.trim().parse().map_err(anyhow::Error::msg)?;
        draft.set(name, value);
    }
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptop_store::config::ApiConfig;
    use laptop_store::session::MemoryTokenStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StoreClient {
        let config = ApiConfig {
            base_url: format!("{}/api", server.uri()),
            ..ApiConfig::default()
        };
        StoreClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_count_rows_on_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/laptops"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "only", "brand": "Dell", "model": "XPS", "processor": "i7",
                    "ram": "16GB", "storage": "1TB SSD", "price": 1500, "stock": 1
                }],
                "meta": { "page": 2, "limit": 9, "totalItems": 10, "totalPages": 2 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows = count_rows(&client, &LaptopFilter::new().page(2).limit(9)).await;
        assert_eq!(rows, 1);
        assert_eq!(views::page_after_delete(2, rows), 1);
    }

    #[tokio::test]
    async fn test_count_rows_failure_keeps_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/laptops"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows = count_rows(&client, &LaptopFilter::new().page(2).limit(9)).await;
        assert_eq!(rows, 0);
        assert_eq!(views::page_after_delete(2, rows), 2);
    }
}
