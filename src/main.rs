//! Collection Console CLI
//!
//! Run `collection-console --help` for usage information.

use clap::{Parser, Subcommand};
use collection_console::backend::{
    BackendApi, BackendClient, CollectionDescriptor, Credentials, SessionToken, UserDescriptor,
};
use collection_console::config::{Config, LogFormat};
use collection_console::web::WebServer;
use collection_console::ConsoleError;
use secrecy::SecretString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "collection-console",
    about = "Web console for creating and listing collections on a PocketBase-style backend",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend base URL
    #[arg(long, global = true, env = "COLLECTION_CONSOLE_BACKEND_URL")]
    backend_url: Option<String>,

    /// Admin identity (email) used to authenticate against the backend
    #[arg(long, global = true, env = "COLLECTION_CONSOLE_ADMIN_IDENTITY")]
    admin_identity: Option<String>,

    /// Admin password used to authenticate against the backend
    #[arg(long, global = true, env = "COLLECTION_CONSOLE_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI server
    Serve {
        /// Address to bind to
        #[arg(short, long)]
        bind: Option<String>,

        /// Directory served under /static
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage collections
    Collections {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Manage users of the `users` collection
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// List collection names
    List {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show a collection definition as JSON
    Show {
        /// Collection name
        name: String,
    },

    /// Create a collection with the configured default fields
    Create {
        /// Collection name
        name: String,

        /// Collection type (defaults to the configured type)
        #[arg(short = 't', long)]
        r#type: Option<String>,

        /// Create the collection without the default fields
        #[arg(long)]
        no_default_fields: bool,
    },

    /// Delete a collection
    Delete {
        /// Collection name
        name: String,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Check whether a user with the given email exists
    Exists {
        /// Email to look for (case-sensitive)
        email: String,
    },

    /// Create a new user
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,

        /// Mark the user as verified
        #[arg(long)]
        verified: bool,
    },

    /// Authenticate as a user and print the session token
    Login {
        /// Username or email
        identity: String,

        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).await?;

    init_logging(&config, cli.verbose);

    // Command-line and environment overrides
    if let Some(url) = &cli.backend_url {
        config.backend.set_url(url).map_err(ConsoleError::from)?;
    }
    if let Some(identity) = cli.admin_identity {
        config.backend.admin.identity = identity;
    }
    if let Some(password) = cli.admin_password {
        config.backend.admin.password = SecretString::from(password);
    }

    match cli.command {
        Commands::Serve { bind, static_dir } => {
            if let Some(bind) = bind {
                config.web.bind = bind;
            }
            if let Some(static_dir) = static_dir {
                config.web.static_dir = static_dir;
            }
            run_web_server(config).await?;
        }
        Commands::Collections { command } => match command {
            CollectionCommands::List { format } => list_collections(config, format).await?,
            CollectionCommands::Show { name } => show_collection(config, name).await?,
            CollectionCommands::Create {
                name,
                r#type,
                no_default_fields,
            } => create_collection(config, name, r#type, no_default_fields).await?,
            CollectionCommands::Delete { name } => delete_collection(config, name).await?,
        },
        Commands::Users { command } => match command {
            UserCommands::Exists { email } => user_exists(config, email).await?,
            UserCommands::Create {
                username,
                email,
                password,
                verified,
            } => create_user(config, username, email, password, verified).await?,
            UserCommands::Login { identity, password } => {
                login_user(config, identity, password).await?
            }
        },
        Commands::Init { force } => init_config(force).await?,
    }

    Ok(())
}

/// Load the given config file, or the default one if it exists
async fn load_config(path: Option<&Path>) -> Result<Config, ConsoleError> {
    if let Some(path) = path {
        return Ok(Config::load(path).await?);
    }

    let default_path = Config::default_path();
    if default_path.exists() {
        Ok(Config::load(&default_path).await?)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(config: &Config, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        1 => EnvFilter::from_default_env().add_directive(Level::DEBUG.into()),
        _ => EnvFilter::from_default_env().add_directive(Level::TRACE.into()),
    };

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
}

fn build_client(config: &Config) -> Result<BackendClient, ConsoleError> {
    Ok(BackendClient::new(config.backend.url.clone())?)
}

/// Build a client and authenticate as admin
async fn admin_session(config: &Config) -> Result<(BackendClient, SessionToken), ConsoleError> {
    let client = build_client(config)?;
    let token = client.authenticate_admin(&config.backend.admin).await?;
    Ok((client, token))
}

/// Read a password from the argument or prompt for it
fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("{}: ", prompt);
    io::stderr().flush()?;
    Ok(rpassword::read_password()?)
}

/// Run the web UI server
async fn run_web_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(&config)?;

    info!(backend = %config.backend.url, admin = %config.backend.admin.identity, "Using backend");

    let web_server = WebServer::new(
        config.web,
        Arc::new(client),
        config.backend.admin,
        config.collections,
    );

    println!("Collection console running at http://{}", web_server.bind_address());
    println!("Press Ctrl+C to stop");

    web_server.run().await.map_err(|e| e as Box<dyn std::error::Error>)
}

/// List collection names
async fn list_collections(config: Config, format: String) -> Result<(), Box<dyn std::error::Error>> {
    let (client, token) = admin_session(&config).await?;
    let collections = client.list_collections(&token).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&collections)?),
        _ => {
            if collections.is_empty() {
                println!("No collections");
                return Ok(());
            }
            println!("NAME");
            println!("{}", "-".repeat(40));
            for name in collections {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

/// Print a collection definition
async fn show_collection(config: Config, name: String) -> Result<(), Box<dyn std::error::Error>> {
    let (client, token) = admin_session(&config).await?;
    let collection = client.get_collection(&token, &name).await?;
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}

/// Create a collection
async fn create_collection(
    config: Config,
    name: String,
    collection_type: Option<String>,
    no_default_fields: bool,
) -> Result<(), ConsoleError> {
    let fields = if no_default_fields {
        vec![]
    } else {
        config.collections.fields.clone()
    };
    let collection_type =
        collection_type.unwrap_or_else(|| config.collections.collection_type.clone());

    // Validate locally before authenticating
    let descriptor = CollectionDescriptor::new(name, collection_type, fields)?;

    let (client, token) = admin_session(&config).await?;
    client.create_collection(&token, &descriptor).await?;

    println!("Collection '{}' created", descriptor.name);
    Ok(())
}

/// Delete a collection
async fn delete_collection(config: Config, name: String) -> Result<(), ConsoleError> {
    let (client, token) = admin_session(&config).await?;
    client.delete_collection(&token, &name).await?;
    println!("Collection '{}' deleted", name);
    Ok(())
}

/// Check for a user by email
async fn user_exists(config: Config, email: String) -> Result<(), ConsoleError> {
    let (client, token) = admin_session(&config).await?;

    if client.user_exists(&token, &email).await? {
        println!("User '{}' exists", email);
    } else {
        println!("User '{}' not found", email);
    }

    Ok(())
}

/// Create a user
async fn create_user(
    config: Config,
    username: String,
    email: String,
    password: Option<String>,
    verified: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = password_or_prompt(password, "Password for new user")?;
    let user = UserDescriptor::new(username, email, password, verified);

    let (client, token) = admin_session(&config).await?;
    let id = client.create_user(&token, &user).await?;

    println!("User '{}' created", user.username);
    println!("ID: {}", id);
    Ok(())
}

/// Authenticate as an end user
async fn login_user(
    config: Config,
    identity: String,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = password_or_prompt(password, "Password")?;
    let client = build_client(&config)?;
    let auth = client
        .authenticate_user(&Credentials::new(identity, password))
        .await?;

    println!("ID:       {}", auth.record.id);
    println!("Username: {}", auth.record.username);
    println!("Email:    {}", auth.record.email);
    println!("Verified: {}", auth.record.verified);
    println!("Token:    {}", auth.token.expose());
    Ok(())
}

/// Write a default configuration file
async fn init_config(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        return Err(format!(
            "Configuration already exists at {}. Use --force to overwrite.",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = r#"# Collection Console configuration

[backend]
url = "http://localhost:8090"
admin_identity = "admin@admin.com"
admin_password = "adminadmin"

[web]
bind = "127.0.0.1:8080"
static_dir = "static"

[collections]
type = "base"
default_fields = [
  { name = "title", type = "text" },
  { name = "payload", type = "json" },
]

[logging]
level = "info"
format = "pretty"
"#;

    tokio::fs::write(&config_path, content).await?;
    println!("Configuration written to {}", config_path.display());
    Ok(())
}
