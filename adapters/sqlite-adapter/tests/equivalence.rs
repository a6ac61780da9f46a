//! Runs the same script against the in-memory and SQLite stores and compares
//! what a caller can observe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use domain::adapters::memory_storage::InMemoryStorage;
use domain::{Clock, Contact, NewContact, NewTestimonial, NewUser, Storage, Testimonial, User};
use sqlite_adapter::SqliteStorage;

struct StepClock(AtomicU64);
impl Clock for StepClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(StepClock(AtomicU64::new(100)))
}

#[derive(Debug, PartialEq)]
struct Observed {
    users: Vec<User>,
    found: Option<User>,
    missing: bool,
    contacts: Vec<Contact>,
    testimonial: Testimonial,
}

async fn script<S: Storage>(store: &S) -> Observed {
    let mut users = Vec::new();
    for name in ["ana", "ben", "cy"] {
        let user = store
            .create_user(NewUser { username: name.into(), password: format!("{name}-pw") })
            .await
            .unwrap();
        assert_eq!(store.get_user(user.id).await.unwrap(), Some(user.clone()));
        users.push(user);
    }
    let found = store.get_user_by_username("ben").await.unwrap();
    let missing = store.get_user_by_username("zed").await.unwrap().is_none();

    let mut created = Vec::new();
    for (name, phone) in [("A", None), ("B", Some("")), ("C", Some("555"))] {
        let contact = store
            .create_contact(NewContact {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: phone.map(Into::into),
                message: format!("message from {name}"),
            })
            .await
            .unwrap();
        created.push(contact);
    }
    let contacts = store.get_contacts().await.unwrap();
    created.reverse();
    assert_eq!(contacts, created);

    let testimonial = store
        .create_testimonial(NewTestimonial {
            name: "Tess".into(),
            title: "Director".into(),
            company: "Contoso".into(),
            message: "Would hire again".into(),
            rating: "3".into(),
            image_url: Some(String::new()),
        })
        .await
        .unwrap();
    let listed = store.get_testimonials().await.unwrap();
    assert!(listed.contains(&testimonial));

    Observed {
        users,
        found,
        missing,
        contacts,
        testimonial,
    }
}

#[tokio::test]
async fn both_stores_observe_the_same_results() {
    let memory = InMemoryStorage::with_clock(clock());
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteStorage::with_clock(dir.path().join("eq.db"), clock()).unwrap();

    let from_memory = script(&memory).await;
    let from_sqlite = script(&sqlite).await;

    assert_eq!(from_memory, from_sqlite);
    let ids: Vec<_> = from_memory.users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let names: Vec<_> = from_memory.contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["C", "B", "A"]);
    assert_eq!(from_memory.contacts[0].email, "c@example.com");
    assert_eq!(from_memory.contacts[0].message, "message from C");
    assert_eq!(from_memory.testimonial.title, "Director");
    assert_eq!(from_memory.testimonial.company, "Contoso");
    assert_eq!(from_memory.testimonial.message, "Would hire again");
    assert_eq!(from_memory.testimonial.rating, "3");
    assert_eq!(from_memory.testimonial.image_url, None);
}

#[tokio::test]
async fn shared_handle_dispatches_to_either_backend() {
    let dir = tempfile::tempdir().unwrap();
    let handles: Vec<domain::SharedStorage> = vec![
        Arc::new(InMemoryStorage::with_clock(clock())),
        Arc::new(SqliteStorage::with_clock(dir.path().join("h.db"), clock()).unwrap()),
    ];
    for handle in handles {
        let user = handle
            .create_user(NewUser { username: "solo".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(user.id, 1);
        let observed = script(&handle).await;
        let ids: Vec<_> = observed.users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }
}
