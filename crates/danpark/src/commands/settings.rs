//! App settings command handlers.

use danpark_core::{AppSettings, SettingsUpdate, Theme};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, Access};

fn detail(settings: &AppSettings) -> String {
    [
        format!("Notifications:  {}", settings.notifications),
        format!("Location:       {}", settings.location),
        format!("Auto refresh:   {}", settings.auto_refresh),
        format!("Theme:          {}", settings.theme),
    ]
    .join("\n")
}

fn plain(settings: &AppSettings) -> String {
    format!(
        "notifications={} location={} auto_refresh={} theme={}",
        settings.notifications, settings.location, settings.auto_refresh, settings.theme
    )
}

pub async fn handle(args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            util::with_session(global, Access::Rest, |session| async move {
                let settings = session.settings().await?;
                let out = output::render_single(&global.output, &settings, detail, plain);
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }
        SettingsCommand::Set { key, value } => {
            let update = parse_update(&key, &value)?;
            util::with_session(global, Access::Rest, |session| async move {
                session.update_settings(&update).await?;
                if !global.quiet {
                    eprintln!("Set {key}");
                }
                Ok(())
            })
            .await
        }
    }
}

fn parse_update(key: &str, value: &str) -> Result<SettingsUpdate, CliError> {
    let mut update = SettingsUpdate::default();
    match key {
        "notifications" => update.notifications = Some(parse_bool(key, value)?),
        "location" => update.location = Some(parse_bool(key, value)?),
        "auto-refresh" | "auto_refresh" => update.auto_refresh = Some(parse_bool(key, value)?),
        "theme" => {
            update.theme = Some(match value {
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                _ => {
                    return Err(CliError::Validation {
                        field: "theme".into(),
                        reason: "must be 'light' or 'dark'".into(),
                    });
                }
            });
        }
        _ => {
            return Err(CliError::Validation {
                field: key.to_owned(),
                reason: "unknown settings key; valid keys: notifications, location, \
                         auto-refresh, theme"
                    .into(),
            });
        }
    }
    Ok(update)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CliError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CliError::Validation {
            field: key.to_owned(),
            reason: "must be 'true' or 'false'".into(),
        }),
    }
}
