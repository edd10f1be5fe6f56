use std::process::exit;
use std::sync::Arc;

use log::*;
use service::config::{Command, Config, ProfileCommand};
use service::logging::Logger;
use session_auth::gateway::{callback_redirect_uri, AuthGateway};
use session_auth::http::ClientBuilder;
use session_auth::profile::{ProfileSync, ProfileUpdate};
use session_auth::session::SessionController;
use session_auth::token::{FileCookieStore, TokenStore};
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    let http_client = match ClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            exit(1);
        }
    };

    let store_path = config.token_store_path();
    debug!("Using token store at {}", store_path.display());
    let store: Arc<dyn TokenStore> = Arc::new(FileCookieStore::new(store_path));

    // The one session instance shared by every command and route
    let session = Arc::new(SessionController::new(store));

    let gateway = AuthGateway::new(config.api_base_url(), http_client.clone());
    let profiles = ProfileSync::new(config.api_base_url(), http_client.clone());
    let redirect_uri = callback_redirect_uri(config.app_base_url());

    match config.command() {
        Command::Serve => {
            let app_state = AppState::new(config, session, http_client);
            if let Err(e) = web::init_server(app_state).await {
                error!("Server failed: {e}");
                exit(1);
            }
        }
        Command::LoginUrl => println!("{}", gateway.login_url(&redirect_uri)),
        Command::SignIn { code } => match session.sign_in(&gateway, &code, &redirect_uri).await {
            Ok(state) => print_json(&state),
            Err(e) => {
                error!("Authentication error: {e}");
                match e.request_failure() {
                    Some(kind) => {
                        eprintln!("{}", kind.user_message());
                        if let Some(details) = kind.details() {
                            eprintln!("{details}");
                        }
                    }
                    None => eprintln!("Failed to authenticate with Google"),
                }
                exit(1);
            }
        },
        Command::Whoami => print_json(&session.current()),
        Command::SetToken { token } => print_json(&session.set_manual_token(&token)),
        Command::Logout => {
            session.logout();
            println!("Logged out");
        }
        Command::Profile { action } => run_profile(action, &session, &profiles).await,
    }
}

async fn run_profile(action: ProfileCommand, session: &SessionController, profiles: &ProfileSync) {
    match action {
        ProfileCommand::Show => {
            let Some(token) = session.token() else {
                eprintln!("Not signed in. Run `sign-in` or `set-token` first.");
                exit(1);
            };
            match profiles.fetch(&token).await {
                Ok(profile) => print_json(&profile),
                Err(e) => {
                    error!("Failed to load profile data: {e}");
                    eprintln!("Failed to load profile data. Please try again later.");
                    exit(1);
                }
            }
        }
        ProfileCommand::Update {
            name,
            asal_sekolah,
            token,
        } => {
            let update = ProfileUpdate { name, asal_sekolah };
            let outcome = profiles
                .submit(session.store(), token.as_deref(), &update)
                .await;
            print_json(&outcome.to_json());
            if !outcome.is_success() {
                exit(1);
            }
            session.refresh();
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to render output: {e}"),
    }
}
