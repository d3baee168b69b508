use std::path::Path;

use colored::Colorize;
use log::info;

use crate::api::{ApiClient, ApiError};
use crate::error::AppResult;
use crate::session::Session;

fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(format!("{what} is required")));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ApiError> {
    require(email, "email")?;
    if !email.contains('@') {
        return Err(ApiError::invalid(format!("`{}` is not an email address", email.trim())));
    }
    Ok(())
}

/// Log in and persist the resulting session.
pub async fn login(client: &ApiClient, session_path: &Path, email: &str, password: &str) -> AppResult<Session> {
    check_email(email)?;
    require(password, "password")?;
    let token = client.login(email.trim(), password).await?;
    let session = Session::from_token(token)?;
    session.save_to(session_path)?;
    info!("logged in as {}", session.user_id);
    Ok(session)
}

/// Create an account. When the API hands back a token the user is logged in
/// straight away; otherwise `None` is returned and they must log in.
pub async fn register(
    client: &ApiClient,
    session_path: &Path,
    email: &str,
    name: &str,
    password: &str,
) -> AppResult<Option<Session>> {
    check_email(email)?;
    require(name, "name")?;
    require(password, "password")?;
    let resp = client.register(email.trim(), name.trim(), password).await?;
    match resp.access_token.filter(|t| !t.is_empty()) {
        Some(token) => {
            let session = Session::from_token(token)?;
            session.save_to(session_path)?;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

pub fn logout(session_path: &Path) -> AppResult<bool> {
    Ok(Session::clear_at(session_path)?)
}

pub fn welcome(session: &Session) -> String {
    format!("{} {}", "Welcome back,".green(), session.display_name().bold())
}

pub fn whoami(session: &Session) -> String {
    let mut out = format!("{}\n  user id: {}", session.display_name().bold(), session.user_id);
    if let Some(email) = &session.email {
        out.push_str(&format!("\n  email:   {email}"));
    }
    out
}
