//! Fetch / filter / paginate / mutate, once for every management page.

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};

use crate::api::{self, Method, RestApi};
use crate::error::{PortalError, PortalResult};
use crate::resources::{ReferenceData, Resource};

pub mod form;
pub mod handlers;
pub mod notify;
pub mod page;
pub mod workspace;

pub use form::{Form, FormPhase};
pub use notify::{Notification, NotificationKind};
pub use workspace::Workspaces;

/// Client-side state of one management page.
pub struct ResourceList<R: Resource> {
    items: Vec<R>,
    references: ReferenceData,
    references_loaded: bool,
    search: String,
    page: usize,
    page_size: usize,
    form: Form<R::Id, R::Input>,
    notification: Option<Notification>,
    notification_ttl: Duration,
}

/// What a page renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<R: Resource> {
    pub resource: &'static str,
    pub items: Vec<R>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub search: String,
    pub form: Form<R::Id, R::Input>,
    pub notification: Option<Notification>,
    pub references: ReferenceData,
}

impl<R: Resource> ResourceList<R> {
    pub fn new(page_size: usize, notification_ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            references: ReferenceData::default(),
            references_loaded: false,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            form: Form::new(),
            notification: None,
            notification_ttl,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn references(&self) -> &ReferenceData {
        &self.references
    }

    pub fn form(&self) -> &Form<R::Id, R::Input> {
        &self.form
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Reloads the collection and its reference collections. On failure the
    /// previous items stay in place.
    pub async fn fetch_all(&mut self, client: &dyn RestApi, token: &str) -> PortalResult<()> {
        let loaded = async {
            let items: Vec<R> = api::get_json(client, R::COLLECTION, Some(token)).await?;
            let refs = ReferenceData::fetch(client, Some(token), R::REFERENCES).await?;
            Ok::<_, PortalError>((items, refs))
        }
        .await;

        match loaded {
            Ok((items, refs)) => {
                self.items = items;
                self.references = refs;
                self.references_loaded = true;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, resource = R::SLUG, "fetch failed");
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Loads one record into the form for editing.
    pub async fn begin_edit(
        &mut self,
        client: &dyn RestApi,
        token: &str,
        id: R::Id,
    ) -> PortalResult<()> {
        match api::get_json::<R>(client, &R::item_path(&id), Some(token)).await {
            Ok(record) => {
                self.form.edit(id, record.to_input());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, resource = R::SLUG, %id, "load for edit failed");
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Creates, or updates the record being edited.
    pub async fn submit(
        &mut self,
        client: &dyn RestApi,
        token: &str,
        input: R::Input,
    ) -> PortalResult<()> {
        // reference checks need the related collections, even on a page
        // that was never listed in this session
        if !R::REFERENCES.is_empty() && !self.references_loaded {
            match ReferenceData::fetch(client, Some(token), R::REFERENCES).await {
                Ok(refs) => {
                    self.references = refs;
                    self.references_loaded = true;
                }
                Err(e) => {
                    error!(error = %e, resource = R::SLUG, "reference fetch failed");
                    self.form.reject(input, e.user_message());
                    self.notify_error(&e);
                    return Err(e);
                }
            }
        }

        if let Err(message) = R::validate(&input, &self.references) {
            warn!(resource = R::SLUG, %message, "form rejected");
            self.form.reject(input, message.clone());
            let err = PortalError::Validation(message);
            self.notify_error(&err);
            return Err(err);
        }

        let editing = self.form.editing_id.clone();
        let in_flight = self.form.start_submit(input.clone())?;
        let sent = match &editing {
            Some(id) => {
                api::send_json(client, Method::Put, &R::item_path(id), Some(token), &input).await
            }
            None => api::send_json(client, Method::Post, R::COLLECTION, Some(token), &input).await,
        };
        in_flight.settle();

        match sent {
            Ok(_) => {
                let verb = if editing.is_some() { "updated" } else { "created" };
                info!(resource = R::SLUG, verb, "saved");
                self.form.succeed();
                self.notify_success(format!("{} {verb} successfully", R::NAME));
                // a failed refetch replaces the success toast with its own error
                let _ = self.fetch_all(client, token).await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, resource = R::SLUG, "save failed");
                self.form.fail(e.user_message());
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.form.cancel()
    }

    /// Deletes after `confirm` agrees. Returns whether a delete happened.
    pub async fn delete<F>(
        &mut self,
        client: &dyn RestApi,
        token: &str,
        id: R::Id,
        confirm: F,
    ) -> PortalResult<bool>
    where
        F: FnOnce(&R::Id) -> bool,
    {
        if !confirm(&id) {
            return Ok(false);
        }
        match api::delete(client, &R::item_path(&id), Some(token)).await {
            Ok(()) => {
                info!(resource = R::SLUG, %id, "deleted");
                self.notify_success(format!("{} deleted successfully", R::NAME));
                let _ = self.fetch_all(client, token).await;
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, resource = R::SLUG, %id, "delete failed");
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    pub fn search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    pub fn paginate(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn filtered(&self) -> Vec<&R> {
        self.items
            .iter()
            .filter(|item| page::matches(&item.label(&self.references), &self.search))
            .collect()
    }

    pub fn visible(&self) -> Vec<&R> {
        let filtered = self.filtered();
        page::page_slice(&filtered, self.page, self.page_size).to_vec()
    }

    pub fn view(&self, now: OffsetDateTime) -> ListView<R> {
        let filtered = self.filtered();
        ListView {
            resource: R::SLUG,
            items: page::page_slice(&filtered, self.page, self.page_size)
                .iter()
                .map(|item| (*item).clone())
                .collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: filtered.len(),
            total_pages: page::total_pages(filtered.len(), self.page_size),
            search: self.search.clone(),
            form: self.form.clone(),
            notification: self
                .notification
                .as_ref()
                .filter(|n| n.is_active(now))
                .cloned(),
            references: self.references.clone(),
        }
    }

    fn notify_success(&mut self, message: String) {
        self.notification = Some(Notification::success(message, self.notification_ttl));
    }

    fn notify_error(&mut self, err: &PortalError) {
        self.notification = Some(Notification::error(
            err.user_message(),
            self.notification_ttl,
        ));
    }
}
