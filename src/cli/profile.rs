use std::path::PathBuf;

use clap::Parser;
use questrack::{IdentityError, IdentityProvider, Workspace};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "Show the current user's profile and groups")]
pub struct Whoami {
    /// Print the profile as JSON
    #[arg(long)]
    json: bool,
}

impl Whoami {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let identity = Workspace::open(root).identity();
        let profile = match identity.current_user() {
            Ok(profile) => profile,
            Err(error @ IdentityError::NotConfigured) => {
                eprintln!("{}", format!("⚠️  {error}").warning());
                eprintln!(
                    "{}",
                    "Set display_name under [profile] in .qt/config.toml, then try again.".dim()
                );
                return Err(error.into());
            }
        };

        if self.json {
            let groups: Vec<_> = profile
                .groups
                .iter()
                .map(|group| {
                    serde_json::json!({
                        "title": group.title,
                        "description": group.description,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "display_name": profile.display_name,
                "email": profile.email,
                "login_name": profile.login_name,
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Welcome, {}", profile.display_name.info());
        if !profile.email.is_empty() {
            println!("  Email: {}", profile.email);
        }
        if !profile.login_name.is_empty() {
            println!("  Login: {}", profile.login_name);
        }

        if profile.groups.is_empty() {
            println!("\n{}", "Not a member of any groups".dim());
        } else {
            println!("\n{}", format!("Groups ({})", profile.groups.len()).dim());
            for group in &profile.groups {
                if group.description.is_empty() {
                    println!("  • {}", group.title);
                } else {
                    println!("  • {} {}", group.title, format!("({})", group.description).dim());
                }
            }
        }
        Ok(())
    }
}
