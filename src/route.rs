//! Path-based view selection.
//!
//! Paths look like the fragment of a browser location: `/questionnaire/7`,
//! `#/followups`, `/questionnaire/edit/7?tab=links`. A leading `#`, any query
//! string and a trailing slash are ignored. Paths that match nothing resolve
//! to [`Route::Home`].

use std::{convert::Infallible, fmt, str::FromStr};

/// A view of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// The landing page.
    #[default]
    Home,
    /// The dashboard.
    Summary,
    /// All questionnaires.
    Questionnaires,
    /// The questionnaire creation form.
    NewQuestionnaire,
    /// The edit form of a questionnaire.
    EditQuestionnaire(String),
    /// One questionnaire.
    Questionnaire(String),
    /// All follow-ups.
    FollowUps,
    /// The follow-up creation form.
    NewFollowUp,
    /// The edit form of a follow-up.
    EditFollowUp(String),
    /// The shared document library.
    Documents,
    /// The current user.
    Profile,
}

impl Route {
    /// Resolves a path. Never fails.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.strip_prefix('#').unwrap_or(path);
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["summary"] => Self::Summary,
            ["questionnaires"] => Self::Questionnaires,
            ["questionnaire", "new"] => Self::NewQuestionnaire,
            ["questionnaire", "edit", id] => Self::EditQuestionnaire((*id).to_string()),
            ["questionnaire", id] => Self::Questionnaire((*id).to_string()),
            ["followups"] => Self::FollowUps,
            ["followup", "new"] => Self::NewFollowUp,
            ["followup", "edit", id] => Self::EditFollowUp((*id).to_string()),
            ["documents"] => Self::Documents,
            ["profile"] => Self::Profile,
            _ => {
                tracing::debug!("no view matches '{path}', falling back to home");
                Self::Home
            }
        }
    }

    /// The view to return to when a record the route names does not exist.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Questionnaire(_) | Self::EditQuestionnaire(_) | Self::NewQuestionnaire => {
                Some(Self::Questionnaires)
            }
            Self::EditFollowUp(_) | Self::NewFollowUp => Some(Self::FollowUps),
            _ => None,
        }
    }
}

impl FromStr for Route {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Summary => f.write_str("/summary"),
            Self::Questionnaires => f.write_str("/questionnaires"),
            Self::NewQuestionnaire => f.write_str("/questionnaire/new"),
            Self::EditQuestionnaire(id) => write!(f, "/questionnaire/edit/{id}"),
            Self::Questionnaire(id) => write!(f, "/questionnaire/{id}"),
            Self::FollowUps => f.write_str("/followups"),
            Self::NewFollowUp => f.write_str("/followup/new"),
            Self::EditFollowUp(id) => write!(f, "/followup/edit/{id}"),
            Self::Documents => f.write_str("/documents"),
            Self::Profile => f.write_str("/profile"),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("/" => Route::Home; "root")]
    #[test_case("" => Route::Home; "empty")]
    #[test_case("/summary" => Route::Summary; "summary")]
    #[test_case("#/questionnaires" => Route::Questionnaires; "hash prefix")]
    #[test_case("/questionnaire/new" => Route::NewQuestionnaire; "new questionnaire")]
    #[test_case("/questionnaire/edit/7" => Route::EditQuestionnaire("7".to_string()); "edit questionnaire")]
    #[test_case("/questionnaire/7/" => Route::Questionnaire("7".to_string()); "trailing slash")]
    #[test_case("/followups?status=open" => Route::FollowUps; "query string")]
    #[test_case("/followup/new" => Route::NewFollowUp; "new follow-up")]
    #[test_case("/followup/edit/abc" => Route::EditFollowUp("abc".to_string()); "edit follow-up")]
    #[test_case("/documents" => Route::Documents; "documents")]
    #[test_case("/profile" => Route::Profile; "profile")]
    #[test_case("/nowhere" => Route::Home; "unknown path")]
    #[test_case("/followup/abc" => Route::Home; "follow-up detail has no view")]
    fn parse(path: &str) -> Route {
        Route::parse(path)
    }

    #[test]
    fn display_is_parseable() {
        for route in [
            Route::Home,
            Route::Summary,
            Route::NewQuestionnaire,
            Route::EditQuestionnaire("9".to_string()),
            Route::Questionnaire("9".to_string()),
            Route::EditFollowUp("x".to_string()),
            Route::Profile,
        ] {
            assert_eq!(Route::parse(&route.to_string()), route);
        }
    }

    #[test]
    fn detail_views_fall_back_to_lists() {
        assert_eq!(
            Route::Questionnaire("1".to_string()).parent(),
            Some(Route::Questionnaires)
        );
        assert_eq!(Route::EditFollowUp("1".to_string()).parent(), Some(Route::FollowUps));
        assert_eq!(Route::Summary.parent(), None);
    }
}
