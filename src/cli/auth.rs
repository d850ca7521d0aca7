//! Sign-in, sign-up and sign-out commands

use dialoguer::{Input, Password, Select, theme::ColorfulTheme};

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::client::models::{AuthResponse, SignUpFormData};
use crate::error::{Error, Result};
use crate::guard::GuardKind;
use crate::notify::ToastLevel;

const INVESTMENT_GOALS: &[&str] = &["Growth", "Income", "Balanced", "Conservative"];
const RISK_TOLERANCE: &[&str] = &["Low", "Medium", "High"];
const INDUSTRIES: &[&str] = &[
    "Technology",
    "Healthcare",
    "Finance",
    "Energy",
    "Consumer Goods",
];

/// Run the signin command
pub async fn signin(
    opts: &GlobalOptions,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAnonymous).await {
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };

    let response = ctx.session.sign_in(&email, &password).await?;
    report(&ctx, response, "Sign in failed.")
}

/// Run the signup command
pub async fn signup(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAnonymous).await {
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let full_name: String = Input::with_theme(&theme)
        .with_prompt("Full name")
        .interact_text()?;
    let email: String = Input::with_theme(&theme)
        .with_prompt("Email")
        .interact_text()?;
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    let country: String = Input::with_theme(&theme)
        .with_prompt("Country")
        .default("US".to_string())
        .interact_text()?;

    let data = SignUpFormData {
        full_name,
        email,
        password,
        country,
        investment_goals: select(&theme, "Investment goals", INVESTMENT_GOALS, 0)?,
        risk_tolerance: select(&theme, "Risk tolerance", RISK_TOLERANCE, 1)?,
        preferred_industry: select(&theme, "Preferred industry", INDUSTRIES, 0)?,
    };

    let response = ctx.session.sign_up(&data).await?;
    report(&ctx, response, "Sign up failed.")
}

/// Run the signout command
pub async fn signout(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let was_signed_in = ctx.session.is_authenticated();

    ctx.session.sign_out().await?;

    if was_signed_in {
        ctx.notify("signed-out", ToastLevel::Success, "Signed out");
    } else {
        ctx.notify(
            "signed-out",
            ToastLevel::Info,
            "Not signed in; local session cleared",
        );
    }
    Ok(())
}

fn select(theme: &ColorfulTheme, prompt: &str, items: &[&str], default: usize) -> Result<String> {
    let index = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?;
    Ok(items[index].to_string())
}

/// Confirm a new session or surface the backend's refusal
fn report(ctx: &CommandContext, response: AuthResponse, fallback: &str) -> Result<()> {
    match ctx.session.snapshot().user {
        Some(user) if ctx.session.is_authenticated() => {
            ctx.notify(
                "signed-in",
                ToastLevel::Success,
                format!("Signed in as {}", user.display_name()),
            );
            Ok(())
        }
        _ => Err(Error::Declined(
            response.message.unwrap_or_else(|| fallback.to_string()),
        )),
    }
}
