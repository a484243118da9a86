//! Template data model and its persisted record shape.
//!
//! DESIGN
//! ======
//! `Template` is the domain value handed to callers. `TemplateRecord` is the
//! document written to the store: visibility is flattened into `isPublic`
//! plus an optional `sharedWith` list, and older field names are accepted
//! on read. A record with `isPublic == true` is public even when it also
//! carries a share list.

use std::collections::BTreeSet;
use std::fmt;

use designer::background::BackgroundAsset;
use designer::content::CertificateContent;
use designer::editor::DesignSnapshot;
use designer::layout::Layout;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

/// Trimmed, lowercased form used for share lists and lookups.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// REQUESTER
// =============================================================================

/// Identity of the user issuing a repository call, as supplied by the auth
/// collaborator. `id_token` is forwarded to the store so its access rules
/// apply.
#[derive(Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: Option<String>,
}

impl Requester {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), email: None, display_name: None, id_token: None }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Normalized email, or `None` when absent or blank.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().map(normalize_email).filter(|e| !e.is_empty())
    }
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    /// Normalized, non-empty set of emails.
    SharedWith(BTreeSet<String>),
}

impl Visibility {
    /// Share with `emails`. Blank entries are dropped; an empty result is
    /// `Private`.
    #[must_use]
    pub fn shared_with<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = emails
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        if set.is_empty() { Self::Private } else { Self::SharedWith(set) }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    #[must_use]
    pub fn is_shared_with(&self, email: &str) -> bool {
        match self {
            Self::SharedWith(set) => set.contains(&normalize_email(email)),
            Self::Public | Self::Private => false,
        }
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// A template before the repository has assigned it an id and an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub content: CertificateContent,
    pub layout: Layout,
    pub background: BackgroundAsset,
    pub visibility: Visibility,
}

impl NewTemplate {
    /// Build from an editor snapshot. The snapshot is moved in, so later
    /// editor changes cannot reach the saved template.
    #[must_use]
    pub fn from_snapshot(name: impl Into<String>, snapshot: DesignSnapshot, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            content: snapshot.content,
            layout: snapshot.layout,
            background: snapshot.background,
            visibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: CertificateContent,
    pub layout: Layout,
    pub background: BackgroundAsset,
    pub owner_id: String,
    pub owner_display_name: String,
    pub created_at_epoch_millis: i64,
    pub visibility: Visibility,
}

impl Template {
    #[must_use]
    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot { content: self.content.clone(), layout: self.layout, background: self.background.clone() }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// Stored document shape for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub name: String,
    #[serde(default)]
    pub content: CertificateContent,
    pub layout: Layout,
    pub background: BackgroundAsset,
    #[serde(alias = "createdBy")]
    pub owner_id: String,
    #[serde(alias = "creatorName", default)]
    pub owner_display_name: String,
    #[serde(alias = "createdAt")]
    pub created_at_epoch_millis: i64,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<Vec<String>>,
}

impl TemplateRecord {
    #[must_use]
    pub fn new(
        template: NewTemplate,
        owner_id: impl Into<String>,
        owner_display_name: impl Into<String>,
        created_at_epoch_millis: i64,
    ) -> Self {
        let (is_public, shared_with) = match template.visibility {
            Visibility::Public => (true, None),
            Visibility::Private => (false, None),
            Visibility::SharedWith(set) => (false, Some(set.into_iter().collect())),
        };
        Self {
            name: template.name,
            content: template.content,
            layout: template.layout,
            background: template.background,
            owner_id: owner_id.into(),
            owner_display_name: owner_display_name.into(),
            created_at_epoch_millis,
            is_public,
            shared_with,
        }
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.is_public {
            return Visibility::Public;
        }
        match &self.shared_with {
            Some(emails) => Visibility::shared_with(emails),
            None => Visibility::Private,
        }
    }

    #[must_use]
    pub fn into_template(self, id: impl Into<String>) -> Template {
        let visibility = self.visibility();
        Template {
            id: id.into(),
            name: self.name,
            content: self.content,
            layout: self.layout,
            background: self.background,
            owner_id: self.owner_id,
            owner_display_name: self.owner_display_name,
            created_at_epoch_millis: self.created_at_epoch_millis,
            visibility,
        }
    }
}
