use std::path::{Path, PathBuf};

use clap::Parser;
use questrack::{FollowUp, Questionnaire, Route, Workspace};
use tracing::instrument;

use super::{
    documents, follow_up, profile::Whoami, questionnaire, status::Status, terminal::Colorize,
};

#[derive(Debug, Parser)]
#[command(about = "Open a view by its path, e.g. '/questionnaire/3' or '#/followups'")]
pub struct Open {
    /// The view's path
    path: String,
}

impl Open {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let route = Route::parse(&self.path);
        tracing::debug!("resolved '{}' to {route}", self.path);
        let route = resolve(&root, route)?;
        dispatch(route, root)
    }
}

/// Replaces a route whose record no longer exists with its parent list.
fn resolve(root: &Path, route: Route) -> anyhow::Result<Route> {
    let mut store = Workspace::open(root).store();
    let exists = match &route {
        Route::Questionnaire(id) | Route::EditQuestionnaire(id) => {
            store.get::<Questionnaire>(id)?.is_some()
        }
        Route::EditFollowUp(id) => store.get::<FollowUp>(id)?.is_some(),
        _ => return Ok(route),
    };
    if exists {
        return Ok(route);
    }

    let parent = route.parent().unwrap_or_default();
    eprintln!(
        "{}",
        format!("⚠️  Nothing found at '{route}', showing '{parent}' instead").warning()
    );
    Ok(parent)
}

fn dispatch(route: Route, root: PathBuf) -> anyhow::Result<()> {
    match route {
        Route::Home | Route::Summary => Status::default().run(root),
        Route::Questionnaires => questionnaire::List::default().run(root),
        Route::Questionnaire(id) => questionnaire::Show::new(id).run(root),
        Route::EditQuestionnaire(id) => {
            let hint = format!("Edit it with 'qt questionnaire edit {id}'.");
            questionnaire::Show::new(id).run(root)?;
            println!("\n{}", hint.dim());
            Ok(())
        }
        Route::NewQuestionnaire => {
            println!(
                "{}",
                "Create a questionnaire with 'qt questionnaire add --title <TITLE> --url <URL>'.".dim()
            );
            Ok(())
        }
        Route::FollowUps => follow_up::List::default().run(root),
        Route::EditFollowUp(id) => {
            let hint = format!("Edit it with 'qt follow-up edit {id}'.");
            follow_up::Show::new(id).run(root)?;
            println!("\n{}", hint.dim());
            Ok(())
        }
        Route::NewFollowUp => {
            println!(
                "{}",
                "Create a follow-up with 'qt follow-up add -q <QUESTIONNAIRE> -s <SUBJECT> --type data-request'.".dim()
            );
            Ok(())
        }
        Route::Documents => documents::DocumentsCommand::list().run(root),
        Route::Profile => Whoami::default().run(root),
    }
}
