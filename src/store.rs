//! Identity records and the store interface the migration drives
//!
//! The store only has to offer id-ordered pages filtered by identity
//! type plus a single-record save. Cursor state lives in
//! [`IdentityCursor`], so one store handle serves both reads and writes.

use crate::enums::IdentityType;
use crate::error::StoreError;

/// One row of `auth_identities`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub user_id: i64,
    pub kind: IdentityType,
    pub name: Option<String>,
    /// The field the migration rewrites
    pub secret: String,
}

/// Keyset position of a paged query: `type = kind AND id > after_id ORDER BY id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCursor {
    pub kind: IdentityType,
    pub after_id: Option<i64>,
    exhausted: bool,
}

impl IdentityCursor {
    pub fn new(kind: IdentityType) -> Self {
        Self {
            kind,
            after_id: None,
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Move past a fetched page
    pub fn advance(&mut self, page: &Page) {
        if let Some(last) = page.identities.last() {
            self.after_id = Some(last.id);
        }
        self.exhausted = !page.has_more;
    }
}

/// One bounded batch of identities, in ascending id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub identities: Vec<Identity>,
    pub has_more: bool,
}

impl Page {
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Paged read + write access to stored identities
pub trait IdentityStore {
    /// Start a query over identities of one kind, ordered by id ascending
    fn query(&self, kind: IdentityType) -> IdentityCursor {
        IdentityCursor::new(kind)
    }

    /// Fetch up to `size` identities after the cursor and advance it
    fn fetch_page(&self, cursor: &mut IdentityCursor, size: usize) -> Result<Page, StoreError>;

    /// Persist `identity.secret`; the type column is never written
    fn save(&self, identity: &Identity) -> Result<(), StoreError>;
}

impl<S: IdentityStore + ?Sized> IdentityStore for &S {
    fn query(&self, kind: IdentityType) -> IdentityCursor {
        (**self).query(kind)
    }

    fn fetch_page(&self, cursor: &mut IdentityCursor, size: usize) -> Result<Page, StoreError> {
        (**self).fetch_page(cursor, size)
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        (**self).save(identity)
    }
}
