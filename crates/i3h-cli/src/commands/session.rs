use crate::context::CliContext;
use anyhow::{Result, bail};
use i3h_core::auth::LoginPrompt;
use i3h_core::route::Navigation;

pub async fn profile(ctx: &CliContext, json: bool) -> Result<()> {
    let store = ctx.session.store();
    let loaded = ctx.session.fetch_profile().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&redacted(store.snapshot()))?);
        return Ok(());
    }

    if loaded.is_none() {
        match store.error() {
            Some(error) => bail!("Failed to load profile: {}", error),
            None => bail!("Not signed in. Run `i3h login` first."),
        }
    }

    println!("{} <{}>", store.full_name(), store.email());
    println!("Initials: {}", store.initials());
    let primary = store.primary_workspace().map(|w| w.id);
    for workspace in store.workspaces() {
        let marker = if Some(&workspace.id) == primary.as_ref() { "*" } else { " " };
        println!("{} {} ({})", marker, workspace.name, workspace.id);
    }
    Ok(())
}

pub async fn token_url(ctx: &CliContext, url: &str) -> Result<()> {
    ctx.session.fetch_profile().await;
    println!("{}", ctx.session.augment_url(url).await);
    Ok(())
}

pub async fn check_route(ctx: &mut CliContext, path: &str) -> Result<()> {
    match ctx.session.check_route(path).await {
        Navigation::Proceed => println!("proceed {}", path),
        Navigation::Redirect { to, replace } => {
            let mode = if replace { "replace" } else { "push" };
            println!("redirect {} -> {} ({})", path, to, mode);

            let mut prompt = LoginPrompt::new();
            prompt.open("Sign in to view this page", path);
            eprintln!("{}: run `i3h login`, then retry {}", prompt.message(), prompt.redirect_url());
        }
    }
    ctx.drain_events();
    Ok(())
}

/// The token never leaves the process through `--json` output.
fn redacted(mut state: i3h_core::auth::AuthState) -> i3h_core::auth::AuthState {
    if state.auth_token.is_some() {
        state.auth_token = Some("<redacted>".to_string());
    }
    state
}
