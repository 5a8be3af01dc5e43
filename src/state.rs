use crate::store::Store;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl FromRef<AppState> for Store {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
