//! Shared fixtures for unit tests

use crate::model::{Book, Entity, EntityRef, PropertyValue};

fn reference(id: &str, name: &str) -> EntityRef {
    EntityRef {
        id: format!("http://example.org/library#{id}"),
        name: name.to_string(),
    }
}

/// A book on the shelf, with author, publisher and genre filled in.
pub fn available_book(id: &str, title: &str) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: reference("a1", "Frank Herbert"),
        publisher: reference("p1", "Chilton"),
        genre: reference("g1", "Science Fiction"),
        state: "Present".to_string(),
        borrowed: false,
        ..Default::default()
    }
}

/// A book currently lent to `borrower_name`.
pub fn borrowed_book(id: &str, title: &str, borrower_name: &str) -> Book {
    Book {
        state: "Borrowed".to_string(),
        borrowed: true,
        borrower_name: borrower_name.to_string(),
        borrower_type: "Student".to_string(),
        borrow_date: "2024-03-01".to_string(),
        return_date: "2024-03-15".to_string(),
        ..available_book(id, title)
    }
}

pub fn entity(entity_type: &str, id: &str, properties: Vec<(&str, PropertyValue)>) -> Entity {
    Entity {
        id: id.to_string(),
        entity_type: entity_type.to_string(),
        properties: properties
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    }
}
