use clap::builder::TypedValueParser as _;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend API root, matching the backend's development server.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default public URL of this application.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

const TOKEN_STORE_FILE: &str = "auth_token.json";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Root URL of the backend API that exchanges codes and stores profiles.
    #[arg(long, env, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Public URL of this application. The OAuth callback is derived from it.
    #[arg(long, env, default_value = DEFAULT_APP_BASE_URL)]
    app_base_url: String,

    /// Where the `auth_token` cookie is persisted. Defaults to the platform data directory.
    #[arg(long, env)]
    token_store_path: Option<PathBuf>,

    /// Timeout in seconds for backend requests. 0 disables the timeout.
    #[arg(long, env, default_value_t = 0)]
    pub http_timeout_secs: u64,

    /// The host interface to listen for incoming connections, loopback only
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
        )]
    pub log_level_filter: LevelFilter,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Serve the sign-in page, OAuth callback and profile editor (default)
    Serve,
    /// Print the provider login URL
    LoginUrl,
    /// Exchange an authorization code and store the issued token
    SignIn {
        /// Authorization code from the provider redirect
        code: String,
    },
    /// Show the identity carried by the stored token
    Whoami,
    /// Store a token entered by hand
    SetToken { token: String },
    /// Clear the stored token
    Logout,
    /// Read or update the profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum ProfileCommand {
    /// Fetch the profile from the backend
    Show,
    /// Save name and school of origin
    Update {
        #[arg(long)]
        name: String,
        /// School of origin
        #[arg(long)]
        asal_sekolah: String,
        /// Token to use when none is stored
        #[arg(long)]
        token: Option<String>,
    },
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn app_base_url(&self) -> &str {
        &self.app_base_url
    }

    pub fn token_store_path(&self) -> PathBuf {
        if let Some(path) = &self.token_store_path {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "profile-portal")
            .map(|dirs| dirs.data_dir().join(TOKEN_STORE_FILE))
            .unwrap_or_else(|| PathBuf::from(TOKEN_STORE_FILE))
    }

    pub fn set_token_store_path(mut self, path: PathBuf) -> Self {
        self.token_store_path = Some(path);
        self
    }

    pub fn set_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url;
        self
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        (self.http_timeout_secs > 0).then(|| Duration::from_secs(self.http_timeout_secs))
    }

    /// The command to run, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
