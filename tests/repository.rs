use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use authorbench::{
    backends::{OrmAuthorRepository, SqlxAuthorRepository},
    traits::AuthorRepository,
    types::author::{Author, NewAuthor},
    Error,
};

const MEMORY: &str = "sqlite::memory:";

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn author(name: &str, email: Option<&str>, born: Option<DateTime<Utc>>) -> NewAuthor {
    NewAuthor {
        name:          name.into(),
        bio:           Some(format!("{name} writes.")),
        email:         email.map(Into::into),
        date_of_birth: born,
    }
}

async fn sqlx_repo() -> SqlxAuthorRepository {
    let repo = SqlxAuthorRepository::connect(MEMORY).await.unwrap();
    repo.create_table().await.unwrap();
    repo
}

async fn orm_repo() -> OrmAuthorRepository {
    let repo = OrmAuthorRepository::connect(MEMORY).await.unwrap();
    repo.create_table().await.unwrap();
    repo
}

async fn create_then_get<R: AuthorRepository>(repo: R) {
    let new = author("Octavia Butler", Some("octavia@example.com"), Some(day(1947, 6, 22)));
    let id = repo.create(&new).await.unwrap();
    assert_eq!(repo.get(id).await.unwrap(), Author::with_id(id, new));

    let bare = NewAuthor {
        name: "Anonymous".into(),
        ..NewAuthor::default()
    };
    let id = repo.create(&bare).await.unwrap();
    assert_eq!(repo.get(id).await.unwrap(), Author::with_id(id, bare));
}

async fn ids_are_distinct<R: AuthorRepository>(repo: R) {
    let a = repo.create(&author("A", None, None)).await.unwrap();
    let b = repo.create(&author("B", None, None)).await.unwrap();
    assert_ne!(a, b);
}

async fn delete_then_get_is_not_found<R: AuthorRepository>(repo: R) {
    let id = repo.create(&author("Italo Calvino", None, None)).await.unwrap();
    repo.delete(id).await.unwrap();
    assert!(matches!(repo.get(id).await, Err(Error::NotFound { id: x }) if x == id));
    assert!(matches!(repo.delete(id).await, Err(Error::NotFound { .. })));
}

async fn update_replaces_fields<R: AuthorRepository>(repo: R) {
    let id = repo
        .create(&author("Ursula", Some("ursula@example.com"), Some(day(1929, 10, 21))))
        .await
        .unwrap();
    let changed = NewAuthor {
        name:          "Ursula K. Le Guin".into(),
        bio:           None,
        email:         Some("ukl@example.org".into()),
        date_of_birth: None,
    };
    repo.update(id, &changed).await.unwrap();
    assert_eq!(repo.get(id).await.unwrap(), Author::with_id(id, changed));
}

async fn missing_ids_are_not_found<R: AuthorRepository>(repo: R) {
    assert!(matches!(repo.get(4242).await, Err(Error::NotFound { id: 4242 })));
    assert!(matches!(repo.delete(4242).await, Err(Error::NotFound { id: 4242 })));
    assert!(matches!(
        repo.update(4242, &author("Nobody", None, None)).await,
        Err(Error::NotFound { id: 4242 })
    ));
}

async fn duplicate_email_is_a_constraint_violation<R: AuthorRepository>(repo: R) {
    repo.create(&author("Toni", Some("same@example.com"), None))
        .await
        .unwrap();
    let err = repo
        .create(&author("Morrison", Some("same@example.com"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)), "{err:?}");

    // NULL emails never collide
    repo.create(&author("X", None, None)).await.unwrap();
    repo.create(&author("Y", None, None)).await.unwrap();
}

async fn list_is_ordered_by_name<R: AuthorRepository>(repo: R) {
    for name in ["Zola", "Achebe", "Murakami", "Achebe"] {
        repo.create(&author(name, None, None)).await.unwrap();
    }
    let listed = repo.list().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Achebe", "Achebe", "Murakami", "Zola"]);
    assert!(listed[0].id < listed[1].id);
}

async fn range_is_inclusive_and_sorted<R: AuthorRepository>(repo: R) {
    let inside = [day(1960, 1, 1), day(1950, 5, 5), day(1970, 1, 1)];
    for (i, born) in inside.iter().enumerate() {
        repo.create(&author(&format!("in{i}"), None, Some(*born)))
            .await
            .unwrap();
    }
    repo.create(&author("early", None, Some(day(1949, 12, 31))))
        .await
        .unwrap();
    repo.create(&author("late", None, Some(day(1970, 1, 2))))
        .await
        .unwrap();
    repo.create(&author("unknown", None, None)).await.unwrap();

    let found = repo
        .list_by_birthdate_range(day(1950, 5, 5), day(1970, 1, 1))
        .await
        .unwrap();
    let born: Vec<DateTime<Utc>> = found.iter().filter_map(|a| a.date_of_birth).collect();
    assert_eq!(born, [day(1950, 5, 5), day(1960, 1, 1), day(1970, 1, 1)]);
    assert_eq!(found.len(), 3);

    let empty = repo
        .list_by_birthdate_range(day(1970, 1, 1), day(1950, 1, 1))
        .await
        .unwrap();
    assert!(empty.is_empty());
}

async fn reset_clears_the_table<R: AuthorRepository>(repo: R) {
    repo.create(&author("A", Some("a@example.com"), None))
        .await
        .unwrap();
    repo.reset().await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
    // the freed email can be used again
    repo.create(&author("A", Some("a@example.com"), None))
        .await
        .unwrap();
}

async fn create_table_is_idempotent<R: AuthorRepository>(repo: R) {
    repo.create(&author("A", None, None)).await.unwrap();
    repo.create_table().await.unwrap();
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

macro_rules! contract {
    ($backend:ident, $connect:ident, [$($case:ident),* $(,)?]) => {
        mod $backend {
            $(
                #[tokio::test]
                async fn $case() {
                    super::$case(super::$connect().await).await;
                }
            )*
        }
    };
}

contract!(
    sqlx_backend,
    sqlx_repo,
    [
        create_then_get,
        ids_are_distinct,
        delete_then_get_is_not_found,
        update_replaces_fields,
        missing_ids_are_not_found,
        duplicate_email_is_a_constraint_violation,
        list_is_ordered_by_name,
        range_is_inclusive_and_sorted,
        reset_clears_the_table,
        create_table_is_idempotent,
    ]
);

contract!(
    orm_backend,
    orm_repo,
    [
        create_then_get,
        ids_are_distinct,
        delete_then_get_is_not_found,
        update_replaces_fields,
        missing_ids_are_not_found,
        duplicate_email_is_a_constraint_violation,
        list_is_ordered_by_name,
        range_is_inclusive_and_sorted,
        reset_clears_the_table,
        create_table_is_idempotent,
    ]
);

#[tokio::test]
async fn backends_agree_on_names() {
    assert_eq!(sqlx_repo().await.name(), "SQLX");
    assert_eq!(orm_repo().await.name(), "ORM");
}
