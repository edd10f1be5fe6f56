//! HTML rendering. Deliberately plain markup, no styling.

use axum::response::Html;
use session_auth::decoder::Identity;
use session_auth::profile::ProfileUpdate;

/// Inline status banner on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Success(String),
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Everything the dashboard page shows.
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub identity: &'a Identity,
    pub form: ProfileUpdate,
    pub banner: Option<Banner>,
    pub show_token_input: bool,
    pub load_error: Option<String>,
}

const TROUBLESHOOTING: [&str; 4] = [
    "Make sure the backend server is running",
    "Check that CORS is correctly configured on the backend",
    "Verify your Google OAuth credentials are correct",
    "Ensure the redirect URI is registered in the Google Console",
];

const TOKEN_FORM: &str = "<form id=\"token-form\" method=\"post\" action=\"/dashboard/token\">\n\
     <label>Auth token <input name=\"manual_token\"></label>\n\
     <button type=\"submit\">Set Token</button>\n</form>";

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

/// Shown while the session is still being resolved.
pub fn loading() -> Html<String> {
    page(
        "Loading",
        "<meta http-equiv=\"refresh\" content=\"1\">\n<p id=\"loading\">Loading...</p>",
    )
}

pub fn login(login_href: &str) -> Html<String> {
    page(
        "Sign in",
        &format!(
            "<h1>Welcome</h1>\n<a id=\"google-login\" href=\"{}\">Sign in with Google</a>\n\
             <p>By signing in, you agree to our Terms of Service and Privacy Policy</p>\n{}",
            escape(login_href),
            TOKEN_FORM
        ),
    )
}

pub fn callback_error(message: &str, details: Option<&str>) -> Html<String> {
    let mut body = format!(
        "<h1>Authentication Error</h1>\n<p id=\"error\">{}</p>\n",
        escape(message)
    );
    if let Some(details) = details {
        body.push_str(&format!("<pre id=\"details\">{}</pre>\n", escape(details)));
    }
    body.push_str("<h2>Troubleshooting</h2>\n<ul>\n");
    for hint in TROUBLESHOOTING {
        body.push_str(&format!("<li>{hint}</li>\n"));
    }
    body.push_str("</ul>\n<a id=\"return\" href=\"/\">Return to Login</a>");
    page("Authentication Error", &body)
}

pub fn dashboard(view: &DashboardView<'_>) -> Html<String> {
    let identity = view.identity;
    let display_name = identity.name.as_deref().unwrap_or(&identity.email);

    let mut body = format!(
        "<h1>Dashboard</h1>\n<p id=\"user\">{} &lt;{}&gt;</p>\n\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Logout</button></form>\n",
        escape(display_name),
        escape(&identity.email)
    );

    if let Some(load_error) = &view.load_error {
        body.push_str(&format!("<p id=\"load-error\">{}</p>\n", escape(load_error)));
    }

    match &view.banner {
        Some(Banner::Success(message)) => {
            body.push_str(&format!("<p id=\"success\">{}</p>\n", escape(message)));
        }
        Some(Banner::Error { message, details }) => {
            body.push_str(&format!("<p id=\"error\">{}</p>\n", escape(message)));
            if let Some(details) = details {
                body.push_str(&format!("<pre id=\"details\">{}</pre>\n", escape(details)));
            }
        }
        None => {}
    }

    if view.show_token_input {
        body.push_str(TOKEN_FORM);
        body.push('\n');
    }

    body.push_str(&format!(
        "<form id=\"profile-form\" method=\"post\" action=\"/dashboard\">\n\
         <label>Name <input name=\"name\" value=\"{}\"></label>\n\
         <label>School of origin <input name=\"asal_sekolah\" value=\"{}\"></label>\n",
        escape(&view.form.name),
        escape(&view.form.asal_sekolah)
    ));
    if view.show_token_input {
        body.push_str("<label>Auth token for this save <input name=\"manual_token\"></label>\n");
    }
    body.push_str("<button type=\"submit\">Save</button>\n</form>");

    page("Dashboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_login_offers_provider_and_manual_token() {
        let Html(html) = login("/auth/login");

        assert!(html.contains("href=\"/auth/login\""));
        assert!(html.contains("action=\"/dashboard/token\""));
    }

    #[test]
    fn test_callback_error_lists_hints_and_details() {
        let Html(html) = callback_error("Server error: 400", Some("{\"detail\": \"bad\"}"));

        assert!(html.contains("Server error: 400"));
        assert!(html.contains("&quot;detail&quot;"));
        assert!(html.contains("Make sure the backend server is running"));
        assert!(html.contains("Return to Login"));
    }

    #[test]
    fn test_dashboard_escapes_form_values() {
        let identity = Identity {
            id: 1,
            email: "a@b.com".to_string(),
            name: None,
        };
        let view = DashboardView {
            identity: &identity,
            form: ProfileUpdate {
                name: "\"><b>".to_string(),
                asal_sekolah: String::new(),
            },
            banner: None,
            show_token_input: false,
            load_error: None,
        };

        let Html(html) = dashboard(&view);
        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;\""));
        assert!(!html.contains("token-form"));
    }
}
