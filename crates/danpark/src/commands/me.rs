//! Account profile command handlers.

use danpark_core::{ProfileUpdate, UserProfile};

use crate::cli::{GlobalOpts, MeArgs, MeCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, Access};

fn detail(profile: &UserProfile) -> String {
    [
        format!("ID:          {}", profile.id),
        format!("Email:       {}", profile.email),
        format!("Name:        {}", profile.name),
        format!("Student ID:  {}", profile.student_id),
        format!(
            "Department:  {}",
            profile.department.as_deref().unwrap_or("-")
        ),
    ]
    .join("\n")
}

pub async fn handle(args: MeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MeCommand::Show => {
            util::with_session(global, Access::Rest, |session| async move {
                let profile = session.profile().await?;
                let out = output::render_single(&global.output, &profile, detail, |p| {
                    p.email.clone()
                });
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }
        MeCommand::Update { name, department } => {
            if name.is_none() && department.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to update; pass --name and/or --department".into(),
                });
            }
            util::with_session(global, Access::Rest, |session| async move {
                let update = ProfileUpdate { name, department };
                let updated = session.update_profile(&update).await?;
                let out = output::render_single(&global.output, &updated, detail, |p| {
                    p.email.clone()
                });
                output::print_output(&out, global.quiet);
                if !global.quiet {
                    eprintln!("Profile updated");
                }
                Ok(())
            })
            .await
        }
    }
}
