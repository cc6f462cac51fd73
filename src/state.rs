use crate::catalog::Catalog;
use crate::compare::StateBoard;
use crate::repository::SeriesRepository;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SeriesRepository>,
    pub catalog: Catalog,
    pub default_start: NaiveDate,
    pub states: Arc<StateBoard>,
}

impl AppState {
    pub fn new(repository: SeriesRepository, catalog: Catalog, default_start: NaiveDate) -> Self {
        Self {
            repository: Arc::new(repository),
            catalog,
            default_start,
            states: Arc::new(StateBoard::empty(default_start)),
        }
    }

    pub fn with_states(mut self, states: StateBoard) -> Self {
        self.states = Arc::new(states);
        self
    }
}
