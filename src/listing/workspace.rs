use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::ResourceList;
use crate::resources::Resource;

/// Everything one signed-in session has open: one list per management
/// page, created on first visit.
pub struct Workspace {
    lists: HashMap<TypeId, Box<dyn Any + Send>>,
    page_size: usize,
    notification_ttl: Duration,
}

impl Workspace {
    pub fn new(page_size: usize, notification_ttl: Duration) -> Self {
        Self {
            lists: HashMap::new(),
            page_size,
            notification_ttl,
        }
    }

    pub fn list<R: Resource>(&mut self) -> &mut ResourceList<R> {
        let (page_size, ttl) = (self.page_size, self.notification_ttl);
        self.lists
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(ResourceList::<R>::new(page_size, ttl)))
            .downcast_mut::<ResourceList<R>>()
            .expect("workspace slot keyed by its own list type")
    }
}

/// Open workspaces by session id.
pub struct Workspaces {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Workspace>>>>,
    page_size: usize,
    notification_ttl: Duration,
}

impl Workspaces {
    pub fn new(page_size: usize, notification_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            page_size,
            notification_ttl,
        }
    }

    pub async fn open(&self, session: Uuid) -> Arc<Mutex<Workspace>> {
        if let Some(ws) = self.sessions.read().await.get(&session) {
            return ws.clone();
        }
        self.sessions
            .write()
            .await
            .entry(session)
            .or_insert_with(|| {
                Arc::new(Mutex::new(Workspace::new(
                    self.page_size,
                    self.notification_ttl,
                )))
            })
            .clone()
    }

    pub async fn get(&self, session: Uuid) -> Option<Arc<Mutex<Workspace>>> {
        self.sessions.read().await.get(&session).cloned()
    }

    pub async fn close(&self, session: Uuid) {
        self.sessions.write().await.remove(&session);
    }
}
