use shared::domain::{Application, Environment, EnvironmentGroup};

use crate::filter;

/// Environment-scoped application links.
#[derive(Debug, Clone, Default)]
pub struct ApplicationCatalog {
    applications: Vec<Application>,
}

impl ApplicationCatalog {
    pub fn new(applications: Vec<Application>) -> Self {
        Self { applications }
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn by_environment(&self, environment: Environment) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|app| app.environment == environment)
            .collect()
    }

    pub fn search(&self, environment: Environment, term: &str) -> Vec<&Application> {
        self.by_environment(environment)
            .into_iter()
            .filter(|app| filter::matches(*app, term))
            .collect()
    }

    pub fn visible_group(&self, environment: Environment, term: &str) -> EnvironmentGroup {
        EnvironmentGroup {
            environment,
            apps: self.search(environment, term).into_iter().cloned().collect(),
        }
    }

    pub fn find(&self, environment: Option<Environment>, name: &str) -> Option<&Application> {
        self.applications.iter().find(|app| {
            environment.map_or(true, |env| app.environment == env)
                && app.name.eq_ignore_ascii_case(name.trim())
        })
    }
}

/// The environment tab being shown plus its search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentView {
    environment: Environment,
    search_term: String,
}

impl Default for EnvironmentView {
    fn default() -> Self {
        Self {
            environment: Environment::Dev,
            search_term: String::new(),
        }
    }
}

impl EnvironmentView {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Switching tabs starts with an empty search.
    pub fn select_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.search_term.clear();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn visible(&self, catalog: &ApplicationCatalog) -> EnvironmentGroup {
        catalog.visible_group(self.environment, &self.search_term)
    }
}

#[cfg(test)]
mod tests {
    use catalog::StaticCatalog;

    use super::*;

    fn catalog() -> ApplicationCatalog {
        ApplicationCatalog::new(StaticCatalog::default().applications())
    }

    fn names(apps: &[&Application]) -> Vec<String> {
        apps.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn search_is_scoped_to_environment() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.search(Environment::Qa, "")),
            ["User Profile UI", "Search API"]
        );
        assert_eq!(names(&catalog.search(Environment::Qa, "api")), ["Search API"]);
        assert!(catalog.search(Environment::Dev, "search").is_empty());
    }

    #[test]
    fn switching_environment_clears_search() {
        let catalog = catalog();
        let mut view = EnvironmentView::default();
        view.set_search_term("phoenix");
        assert_eq!(view.visible(&catalog).apps.len(), 1);

        view.select_environment(Environment::Prod);
        assert_eq!(view.search_term(), "");
        let group = view.visible(&catalog);
        assert_eq!(group.environment, Environment::Prod);
        assert_eq!(group.apps.len(), 2);
    }

    #[test]
    fn find_matches_name_ignoring_case() {
        let catalog = catalog();
        let app = catalog.find(None, "payments api").expect("found");
        assert_eq!(app.url, "https://payments.example.prod");
        assert!(catalog.find(Some(Environment::Dev), "Payments API").is_none());
    }
}
