//! Login, logout and the forgot-password OTP sequence.

use clap::Args;

use crate::console::{output, prompt_input, prompt_password};
use crate::error::Result;
use crate::gateway::Navigator;
use crate::AppContext;

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Admin email; prompted for when omitted
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Arguments for `forgot-password`
#[derive(Debug, Args)]
pub struct ForgotPasswordArgs {
    /// Account email; prompted for when omitted
    #[arg(short, long)]
    pub email: Option<String>,
}

pub async fn login(ctx: &AppContext, args: &LoginArgs) -> Result<()> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => prompt_input("Email")?,
    };
    let password = prompt_password("Password")?;

    ctx.auth.login(&email, &password).await?;
    ctx.navigator.navigate("/dashboard").await;
    output::print_success(&format!("Logged in as {}", email.to_lowercase()));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth.logout().await?;
    ctx.navigator.navigate(crate::gateway::LOGIN_ROUTE).await;
    output::print_success("Logged out");
    Ok(())
}

/// Three-step recovery: request an OTP, trade it for a reset token, set the
/// new password.
pub async fn forgot_password(ctx: &AppContext, args: &ForgotPasswordArgs) -> Result<()> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => prompt_input("Email")?,
    };

    ctx.auth.send_password_otp(&email).await?;
    output::print_success(&format!("OTP sent to {}", email.to_lowercase()));

    let otp = prompt_input("OTP")?;
    let reset_token = ctx.auth.verify_password_otp(&email, otp.trim()).await?;
    output::print_success("OTP verified");

    let password = prompt_password("New password")?;
    let confirm = prompt_password("Confirm new password")?;
    if password != confirm {
        return Err(crate::error::AdminError::Input(
            "passwords do not match".to_string(),
        ));
    }

    ctx.auth.reset_password(&reset_token, &password).await?;
    output::print_success("Password reset. Log in with the new password.");
    Ok(())
}
