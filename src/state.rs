//! Application state: the composition root a host drives.
//!
//! DESIGN
//! ======
//! `AppState` owns the editor, the current screen, the signed-in requester
//! and the gallery view, plus one [`RequestGate`] per async action kind.
//! Every async action is exposed split (`begin_*`, run the returned work,
//! `finish_*`) so a host can await off its UI loop, and combined for simple
//! callers. A response whose token went stale (superseded, or invalidated
//! by navigation or sign-out) is dropped as [`Outcome::Discarded`] and
//! leaves state untouched.

use std::sync::Arc;

use designer::background::BackgroundAsset;
use designer::editor::{DesignSnapshot, Editor};
use designer::request::{RequestGate, RequestToken};
use tracing::{debug, info};

use crate::error::{ErrorClass, ErrorCode};
use crate::model::{NewTemplate, Requester, Template, Visibility};
use crate::services::backgrounds::{BackgroundProvisioner, GenerateError};
use crate::services::templates::{DeleteOutcome, Scope, TemplateError, TemplateRepository};

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Editor,
    Gallery,
}

/// What the gallery screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryView {
    pub scope: Scope,
    pub templates: Vec<Template>,
    pub loading: bool,
    /// Message for the retry banner.
    pub error: Option<String>,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self { scope: Scope::Public, templates: Vec::new(), loading: false, error: None }
    }
}

/// Result of settling an async action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Applied(T),
    /// The response arrived for a stale request and was dropped.
    Discarded,
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("a {0} request is already in progress")]
    Busy(&'static str),
    #[error("sign in to {0}")]
    SignedOut(&'static str),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl ErrorCode for ActionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy(_) => "E_BUSY",
            Self::SignedOut(_) => "E_SIGNED_OUT",
            Self::Template(e) => e.error_code(),
            Self::Generate(e) => e.error_code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Busy(_) => ErrorClass::InvalidInput,
            Self::SignedOut(_) => ErrorClass::Permission,
            Self::Template(e) => e.class(),
            Self::Generate(e) => e.class(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Template(e) => e.retryable(),
            Self::Generate(e) => e.retryable(),
            Self::Busy(_) | Self::SignedOut(_) => false,
        }
    }
}

/// Everything a save needs once admitted.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub token: RequestToken,
    pub requester: Requester,
    pub template: NewTemplate,
}

// =============================================================================
// APP STATE
// =============================================================================

pub struct AppState {
    pub editor: Editor,
    screen: Screen,
    requester: Option<Requester>,
    gallery: GalleryView,
    generate_gate: RequestGate,
    save_gate: RequestGate,
    gallery_gate: RequestGate,
    delete_gate: RequestGate,
    repository: Arc<TemplateRepository>,
    provisioner: Arc<BackgroundProvisioner>,
}

impl AppState {
    #[must_use]
    pub fn new(repository: Arc<TemplateRepository>, provisioner: Arc<BackgroundProvisioner>) -> Self {
        Self {
            editor: Editor::new(),
            screen: Screen::default(),
            requester: None,
            gallery: GalleryView::default(),
            generate_gate: RequestGate::new(),
            save_gate: RequestGate::new(),
            gallery_gate: RequestGate::new(),
            delete_gate: RequestGate::new(),
            repository,
            provisioner,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }

    #[must_use]
    pub fn gallery(&self) -> &GalleryView {
        &self.gallery
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<TemplateRepository> {
        &self.repository
    }

    #[must_use]
    pub fn provisioner(&self) -> &Arc<BackgroundProvisioner> {
        &self.provisioner
    }

    /// Scopes the gallery offers; private scopes need a signed-in requester.
    #[must_use]
    pub fn available_scopes(&self) -> Vec<Scope> {
        if self.requester.is_some() { Scope::ALL.to_vec() } else { vec![Scope::Public] }
    }

    // --- Navigation & session ---

    /// Switch screens. Leaving a screen makes every pending response stale.
    pub fn navigate(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        self.editor.cancel_drag();
        self.invalidate_all();
        self.gallery.loading = false;
        self.screen = screen;
    }

    pub fn sign_in(&mut self, requester: Requester) {
        info!(uid = %requester.id, "state: signed in");
        self.requester = Some(requester);
    }

    /// Forget the requester, drop pending responses and any private listing.
    pub fn sign_out(&mut self) {
        if let Some(requester) = self.requester.take() {
            info!(uid = %requester.id, "state: signed out");
        }
        self.invalidate_all();
        self.gallery = GalleryView::default();
    }

    fn invalidate_all(&mut self) {
        self.generate_gate.invalidate();
        self.save_gate.invalidate();
        self.gallery_gate.invalidate();
        self.delete_gate.invalidate();
    }

    /// Open a listed template in the editor.
    pub fn load_template(&mut self, template: &Template) {
        self.editor.load(template.snapshot());
        self.navigate(Screen::Editor);
        info!(id = %template.id, "state: template loaded");
    }

    // --- Generate ---

    /// # Errors
    ///
    /// [`ActionError::Busy`] while a generation is pending.
    pub fn begin_generate(&mut self) -> Result<RequestToken, ActionError> {
        self.generate_gate.try_begin().ok_or(ActionError::Busy("generate"))
    }

    /// Apply a generation result: the new background is added and selected.
    ///
    /// # Errors
    ///
    /// The generation error, when the token is current.
    pub fn finish_generate(
        &mut self,
        token: RequestToken,
        result: Result<BackgroundAsset, GenerateError>,
    ) -> Result<Outcome, ActionError> {
        if !self.generate_gate.finish(token) {
            debug!(generation = token.generation(), "state: stale generate response discarded");
            return Ok(Outcome::Discarded);
        }
        self.editor.add_generated_background(result?);
        Ok(Outcome::Applied(()))
    }

    /// # Errors
    ///
    /// See [`Self::begin_generate`] and [`Self::finish_generate`].
    pub async fn generate_background(&mut self, prompt: &str) -> Result<Outcome, ActionError> {
        let token = self.begin_generate()?;
        let provisioner = Arc::clone(&self.provisioner);
        let result = provisioner.generate(prompt).await;
        self.finish_generate(token, result)
    }

    // --- Save ---

    /// Admit a save of the current design.
    ///
    /// # Errors
    ///
    /// - [`ActionError::SignedOut`] without a requester.
    /// - [`ActionError::Busy`] while a save is pending.
    pub fn begin_save(&mut self, name: &str, visibility: Visibility) -> Result<SaveTicket, ActionError> {
        let requester = self.requester.clone().ok_or(ActionError::SignedOut("save templates"))?;
        let token = self.save_gate.try_begin().ok_or(ActionError::Busy("save"))?;
        let snapshot: DesignSnapshot = self.editor.snapshot();
        Ok(SaveTicket { token, requester, template: NewTemplate::from_snapshot(name, snapshot, visibility) })
    }

    /// # Errors
    ///
    /// The save error, when the token is current.
    pub fn finish_save(
        &mut self,
        token: RequestToken,
        result: Result<String, TemplateError>,
    ) -> Result<Outcome<String>, ActionError> {
        if !self.save_gate.finish(token) {
            debug!(generation = token.generation(), "state: stale save response discarded");
            return Ok(Outcome::Discarded);
        }
        Ok(Outcome::Applied(result?))
    }

    /// # Errors
    ///
    /// See [`Self::begin_save`] and [`TemplateRepository::save`].
    pub async fn save_template(&mut self, name: &str, visibility: Visibility) -> Result<Outcome<String>, ActionError> {
        let ticket = self.begin_save(name, visibility)?;
        let repository = Arc::clone(&self.repository);
        let result = repository.save(ticket.template, &ticket.requester).await;
        self.finish_save(ticket.token, result)
    }

    // --- Gallery ---

    /// Start loading `scope`. Requesting a different scope supersedes a
    /// pending listing.
    ///
    /// # Errors
    ///
    /// [`ActionError::Busy`] while the same scope is already loading.
    pub fn begin_list(&mut self, scope: Scope) -> Result<RequestToken, ActionError> {
        if self.gallery.loading && self.gallery.scope != scope {
            self.gallery_gate.invalidate();
        }
        let token = self.gallery_gate.try_begin().ok_or(ActionError::Busy("gallery"))?;
        if self.gallery.scope != scope {
            self.gallery.templates.clear();
        }
        self.gallery.scope = scope;
        self.gallery.loading = true;
        self.gallery.error = None;
        Ok(token)
    }

    /// Settle a listing. Failures land in [`GalleryView::error`].
    pub fn finish_list(&mut self, token: RequestToken, result: Result<Vec<Template>, TemplateError>) -> Outcome {
        if !self.gallery_gate.finish(token) {
            debug!(generation = token.generation(), "state: stale gallery response discarded");
            return Outcome::Discarded;
        }
        self.gallery.loading = false;
        match result {
            Ok(templates) => self.gallery.templates = templates,
            Err(e) => self.gallery.error = Some(e.to_string()),
        }
        Outcome::Applied(())
    }

    /// # Errors
    ///
    /// See [`Self::begin_list`].
    pub async fn refresh_gallery(&mut self, scope: Scope) -> Result<Outcome, ActionError> {
        let token = self.begin_list(scope)?;
        let repository = Arc::clone(&self.repository);
        let result = repository.list(scope, self.requester.as_ref()).await;
        Ok(self.finish_list(token, result))
    }

    // --- Delete ---

    /// # Errors
    ///
    /// - [`ActionError::SignedOut`] without a requester.
    /// - [`ActionError::Busy`] while a delete is pending.
    pub fn begin_delete(&mut self) -> Result<(RequestToken, Requester), ActionError> {
        let requester = self.requester.clone().ok_or(ActionError::SignedOut("delete templates"))?;
        let token = self.delete_gate.try_begin().ok_or(ActionError::Busy("delete"))?;
        Ok((token, requester))
    }

    /// Settle a delete; on success the template leaves the gallery view.
    ///
    /// # Errors
    ///
    /// The delete error, when the token is current.
    pub fn finish_delete(
        &mut self,
        token: RequestToken,
        id: &str,
        result: Result<DeleteOutcome, TemplateError>,
    ) -> Result<Outcome<DeleteOutcome>, ActionError> {
        if !self.delete_gate.finish(token) {
            debug!(generation = token.generation(), "state: stale delete response discarded");
            return Ok(Outcome::Discarded);
        }
        let outcome = result?;
        self.gallery.templates.retain(|t| t.id != id);
        Ok(Outcome::Applied(outcome))
    }

    /// # Errors
    ///
    /// See [`Self::begin_delete`] and [`TemplateRepository::delete`].
    pub async fn delete_template(&mut self, id: &str) -> Result<Outcome<DeleteOutcome>, ActionError> {
        let (token, requester) = self.begin_delete()?;
        let repository = Arc::clone(&self.repository);
        let result = repository.delete(id, &requester).await;
        self.finish_delete(token, id, result)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
