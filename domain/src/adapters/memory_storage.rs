use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::seed::seed_testimonials;
use crate::{
    Clock, Contact, NewContact, NewTestimonial, NewUser, RecordId, Storage, StorageError,
    SystemClock, Testimonial, User,
};

/// Process-local store for development and tests.
///
/// Every collection and counter sits behind one mutex, so a create reads,
/// bumps and stores under a single lock acquisition and ids cannot repeat.
pub struct InMemoryStorage {
    inner: Mutex<State>,
    clock: Arc<dyn Clock>,
}

struct State {
    users: BTreeMap<RecordId, User>,
    contacts: BTreeMap<RecordId, Contact>,
    testimonials: BTreeMap<RecordId, Testimonial>,
    next_user_id: RecordId,
    next_contact_id: RecordId,
    next_testimonial_id: RecordId,
}

impl State {
    fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            contacts: BTreeMap::new(),
            testimonials: BTreeMap::new(),
            next_user_id: 1,
            next_contact_id: 1,
            next_testimonial_id: 1,
        }
    }

    fn insert_testimonial(&mut self, input: NewTestimonial) -> Testimonial {
        let id = self.next_testimonial_id;
        self.next_testimonial_id += 1;
        let testimonial = Testimonial::from_new(id, input);
        self.testimonials.insert(id, testimonial.clone());
        testimonial
    }
}

impl InMemoryStorage {
    /// Empty store on the wall clock, seeded with the sample testimonials.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let mut state = State::new();
        for testimonial in seed_testimonials() {
            state.insert_testimonial(testimonial);
        }
        info!(
            testimonials = state.testimonials.len(),
            "in-memory storage seeded"
        );
        Self {
            inner: Mutex::new(state),
            clock,
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Backend("mutex poisoned".into()))
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>, StorageError> {
        let state = self.state()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let state = self.state()?;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut state = self.state()?;
        let id = state.next_user_id;
        state.next_user_id += 1;
        let user = User::from_new(id, user);
        state.users.insert(id, user.clone());
        debug!(id, "user created");
        Ok(user)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError> {
        let mut state = self.state()?;
        let id = state.next_contact_id;
        state.next_contact_id += 1;
        let contact = Contact::from_new(id, self.clock.now(), contact);
        state.contacts.insert(id, contact.clone());
        debug!(id, "contact created");
        Ok(contact)
    }

    async fn get_contacts(&self) -> Result<Vec<Contact>, StorageError> {
        let state = self.state()?;
        let mut items: Vec<_> = state.contacts.values().cloned().collect();
        // Sort by created_at desc, newest id first on ties
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    async fn get_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        let state = self.state()?;
        Ok(state.testimonials.values().cloned().collect())
    }

    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError> {
        let mut state = self.state()?;
        let testimonial = state.insert_testimonial(testimonial);
        debug!(id = testimonial.id, "testimonial created");
        Ok(testimonial)
    }
}
