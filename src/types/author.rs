use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type AuthorId = i64;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
}

/// Everything about an author except the id the store assigns.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthor {
    pub name:          String,
    pub bio:           Option<String>,
    pub email:         Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
}

impl Author {
    pub fn with_id(id: AuthorId, new: NewAuthor) -> Self {
        Self {
            id,
            name: new.name,
            bio: new.bio,
            email: new.email,
            date_of_birth: new.date_of_birth,
        }
    }
}

impl From<Author> for NewAuthor {
    fn from(author: Author) -> Self {
        Self {
            name:          author.name,
            bio:           author.bio,
            email:         author.email,
            date_of_birth: author.date_of_birth,
        }
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.email, &self.date_of_birth) {
            (None, None) => write!(f, "{} ({})", self.name, self.id),
            (Some(email), None) => write!(f, "{} <{}> ({})", self.name, email, self.id),
            (None, Some(born)) => {
                write!(f, "{}, born {} ({})", self.name, born.format("%Y-%m-%d"), self.id)
            }
            (Some(email), Some(born)) => write!(
                f,
                "{} <{}>, born {} ({})",
                self.name,
                email,
                born.format("%Y-%m-%d"),
                self.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn with_id_keeps_every_field() {
        let new = NewAuthor {
            name:          "Ursula Le Guin".into(),
            bio:           Some("Earthsea".into()),
            email:         Some("ursula@example.com".into()),
            date_of_birth: Some(Utc.with_ymd_and_hms(1929, 10, 21, 0, 0, 0).unwrap()),
        };
        let author = Author::with_id(3, new.clone());
        assert_eq!(author.id, 3);
        assert_eq!(NewAuthor::from(author), new);
    }

    #[test]
    fn display() {
        let author = Author {
            id: 1,
            name: "Octavia Butler".into(),
            bio: None,
            email: None,
            date_of_birth: Some(Utc.with_ymd_and_hms(1947, 6, 22, 0, 0, 0).unwrap()),
        };
        assert_eq!(author.to_string(), "Octavia Butler, born 1947-06-22 (1)");
    }
}
