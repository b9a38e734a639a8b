use anyhow::{Context as _, Result, bail};
use console::{Term, style};
use tubementor_core::{
    CallbackState, OAuthCallback,
    oauth::authorize_url,
    types::{SignupForm, UserProfile},
};

use crate::App;

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let term = Term::stderr();
    term.write_str("Password: ")?;
    let password = term.read_secure_line().context("failed to read password")?;
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

fn print_signed_in(user: &UserProfile) {
    println!(
        "{} Signed in as {} {}",
        style("✓").green().bold(),
        style(user.display_name()).cyan().bold(),
        style(format!("<{}>", user.email)).dim()
    );
}

pub async fn login(app: &mut App, email: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    let user = app.session.login(app.api.as_ref(), email, &password).await?;
    print_signed_in(user);
    Ok(())
}

pub async fn signup(
    app: &mut App,
    email: &str,
    name: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let form = SignupForm {
        email: email.trim().to_string(),
        password: read_password(password)?,
        full_name: name.filter(|n| !n.trim().is_empty()),
    };
    let user = app.session.signup(app.api.as_ref(), form).await?;
    print_signed_in(user);
    Ok(())
}

pub fn oauth_url(app: &App) -> Result<()> {
    let url = authorize_url(&app.config)?;
    eprintln!(
        "{} Open this URL, sign in, then pass the address you land on to {}",
        style("→").cyan().bold(),
        style("tubementor oauth-callback").bold()
    );
    println!("{url}");
    Ok(())
}

pub async fn oauth_callback(app: &mut App, fragment: &str) -> Result<()> {
    let mut callback = OAuthCallback::new();
    let state = callback
        .complete(fragment, &mut app.session, app.api.as_ref())
        .await
        .clone();
    match state {
        CallbackState::Success => {
            if let Some(user) = app.session.user() {
                print_signed_in(user);
            }
            Ok(())
        }
        CallbackState::Error(message) => {
            bail!("{message}. Run `tubementor oauth-url` to try again")
        }
        CallbackState::Processing => bail!("Google sign-in did not finish"),
    }
}

pub fn logout(app: &mut App) -> Result<()> {
    app.session.logout(app.api.as_ref())?;
    println!("{} Signed out", style("✓").green().bold());
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    match app.session.user() {
        Some(user) => {
            println!("{}", style(user.display_name()).cyan().bold());
            println!("  {} {}", style("email:").dim(), user.email);
            println!("  {} {}", style("provider:").dim(), user.auth_provider);
            if user.is_admin {
                println!("  {} yes", style("admin:").dim());
            }
        }
        None => println!("{}", style("Not signed in").dim()),
    }
    Ok(())
}
