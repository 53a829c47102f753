use std::sync::RwLock;

/// Supplies the identifier of the user looking at the data.
pub trait ViewerIdentity: Send + Sync {
    fn current_viewer_id(&self) -> Option<String>;
}

/// Viewer identity fixed for the whole session, replaceable on login/logout.
#[derive(Debug, Default)]
pub struct SessionViewer(RwLock<Option<String>>);

impl SessionViewer {
    pub fn new(username: Option<String>) -> Self {
        Self(RwLock::new(username))
    }

    pub fn set(&self, username: Option<String>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = username;
    }
}

impl ViewerIdentity for SessionViewer {
    fn current_viewer_id(&self) -> Option<String> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
