use crate::context::CliContext;
use anyhow::{Context, Result, bail};
use clap::Args;
use i3h_core::route::Navigation;
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct LoginArgs {
    /// Account email or username
    #[arg(required_unless_present = "access_token")]
    username: Option<String>,

    /// Password; read from stdin when omitted
    #[arg(long, env = "I3H_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Access token returned by the hosted UI redirect
    #[arg(long, conflicts_with = "username")]
    access_token: Option<String>,

    /// ID token returned alongside the access token
    #[arg(long, requires = "access_token")]
    id_token: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, requires = "access_token")]
    expires_in: Option<i64>,
}

pub async fn login(ctx: &mut CliContext, args: LoginArgs) -> Result<()> {
    let provider = ctx.cognito()?;

    match (args.access_token, args.username) {
        (Some(access_token), _) => {
            provider.complete_redirect_sign_in(&access_token, args.id_token, args.expires_in)?;
        }
        (None, Some(username)) => {
            let password = match args.password {
                Some(password) => password,
                None => read_password()?,
            };
            provider.sign_in(&username, &password).await?;
        }
        (None, None) => bail!("Either a username or --access-token is required"),
    }

    let landing = ctx.drain_events().into_iter().find_map(|nav| match nav {
        Navigation::Redirect { to, .. } => Some(to),
        Navigation::Proceed => None,
    });

    match ctx.session.fetch_profile().await {
        Some(snapshot) => {
            println!("✅ Signed in as {}", ctx.session.store().display_name());
            println!("   {} workspace(s)", snapshot.workspaces.len());
        }
        None => {
            let reason = ctx
                .session
                .store()
                .error()
                .unwrap_or_else(|| "no session".to_string());
            bail!("Signed in, but the profile could not be loaded: {}", reason);
        }
    }
    if let Some(landing) = landing {
        println!("   Continue at {}", landing);
    }
    Ok(())
}

pub async fn logout(ctx: &mut CliContext) -> Result<()> {
    ctx.session.sign_out().await;
    ctx.drain_events();
    println!("✅ Signed out");
    Ok(())
}

pub fn sign_in_url(ctx: &CliContext, orcid: bool) -> Result<()> {
    let provider = ctx.cognito()?;
    let identity_provider = if orcid {
        let providers = ctx.config.auth.external_oidc_providers();
        let Some(orcid) = providers.into_iter().find(|p| p.name == "ORCID") else {
            bail!("ORCID sign-in is not configured: set ORCID_CLIENT_ID");
        };
        Some(orcid.name)
    } else {
        None
    };

    println!("{}", provider.hosted_ui_sign_in_url(identity_provider.as_deref())?);
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}
