//! Catalog table and the borrow/return option lists.

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    html::{escape, ViewerLink},
    model::{id_from_uri, Book, EntityRef, EntityType},
    ui::{LoadingGuard, LoadingIndicator},
};

pub const SELECT_PLACEHOLDER: &str = "Select a Book";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrowing {
    pub borrower_name: String,
    pub borrower_type: String,
    pub borrow_date: String,
    pub return_date: String,
}

/// A book is either on the shelf or out with exactly one borrowing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Borrowed(Borrowing),
}

impl Availability {
    pub fn of(book: &Book) -> Self {
        if book.borrowed {
            Availability::Borrowed(Borrowing {
                borrower_name: book.borrower_name.clone(),
                borrower_type: book.borrower_type.clone(),
                borrow_date: book.borrow_date.clone(),
                return_date: book.return_date.clone(),
            })
        } else {
            Availability::Available
        }
    }

    pub fn borrowing(&self) -> Option<&Borrowing> {
        match self {
            Availability::Available => None,
            Availability::Borrowed(b) => Some(b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub book: Book,
    pub availability: Availability,
}

impl CatalogRow {
    pub fn new(book: Book) -> Self {
        let availability = Availability::of(&book);
        CatalogRow { book, availability }
    }

    pub fn to_html(&self) -> String {
        let book = &self.book;
        let borrowing = self.availability.borrowing();
        let class = match self.availability {
            Availability::Available => "",
            Availability::Borrowed(_) => " class=\"borrowed\"",
        };
        format!(
            "<tr data-id=\"{id_attr}\"{class}><td>{id}</td>\
             <td>{title}</td><td>{author}</td><td>{publisher}</td><td>{genre}</td>\
             <td>{name}</td><td>{btype}</td><td>{bdate}</td><td>{rdate}</td><td>{state}</td></tr>",
            id_attr = escape(&book.id),
            id = escape(&book.id),
            title = ViewerLink::new(EntityType::Book, id_from_uri(&book.id)).anchor(&book.title),
            author = ref_anchor(EntityType::Author, &book.author),
            publisher = ref_anchor(EntityType::Publisher, &book.publisher),
            genre = ref_anchor(EntityType::Genre, &book.genre),
            name = escape(borrowing.map(|b| b.borrower_name.as_str()).unwrap_or_default()),
            btype = escape(borrowing.map(|b| b.borrower_type.as_str()).unwrap_or_default()),
            bdate = escape(borrowing.map(|b| b.borrow_date.as_str()).unwrap_or_default()),
            rdate = escape(borrowing.map(|b| b.return_date.as_str()).unwrap_or_default()),
            state = escape(&book.state),
        )
    }
}

fn ref_anchor(entity_type: EntityType, entity: &EntityRef) -> String {
    ViewerLink::new(entity_type, id_from_uri(&entity.id)).anchor(&entity.name)
}

/// One entry of the borrow or return select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOption {
    /// Full book URI, submitted as `book_id`.
    pub value: String,
    /// `"<short id> - <title>"`
    pub label: String,
}

impl BookOption {
    pub fn for_book(book: &Book) -> Self {
        BookOption {
            value: book.id.clone(),
            label: format!("{} - {}", id_from_uri(&book.id), book.title),
        }
    }
}

/// Renders a select's options, placeholder first.
pub fn options_html(options: &[BookOption]) -> String {
    let mut html = format!("<option value=\"\">{SELECT_PLACEHOLDER}</option>");
    for option in options {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            escape(&option.value),
            escape(&option.label)
        ));
    }
    html
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    pub rows: Vec<CatalogRow>,
    /// Books that are currently available.
    pub borrow_options: Vec<BookOption>,
    /// Books that are currently borrowed.
    pub return_options: Vec<BookOption>,
}

impl CatalogView {
    pub fn from_books(books: Vec<Book>) -> Self {
        let mut view = CatalogView::default();
        for book in books {
            let option = BookOption::for_book(&book);
            let row = CatalogRow::new(book);
            match row.availability {
                Availability::Available => view.borrow_options.push(option),
                Availability::Borrowed(_) => view.return_options.push(option),
            }
            view.rows.push(row);
        }
        view
    }

    pub fn table_html(&self) -> String {
        self.rows.iter().map(CatalogRow::to_html).collect()
    }

    pub fn borrow_options_html(&self) -> String {
        options_html(&self.borrow_options)
    }

    pub fn return_options_html(&self) -> String {
        options_html(&self.return_options)
    }
}

/// Fetches `/api/books` with the loading indicator up for the duration of the request.
pub async fn load_catalog<T, L>(
    client: &ApiClient<T>,
    loading: &L,
) -> Result<CatalogView, CatalogError>
where
    T: ApiTransport,
    L: LoadingIndicator + ?Sized,
{
    let _loading = LoadingGuard::new(loading);
    let response = client.books().await?;
    tracing::debug!("Loaded {} books", response.books.len());
    Ok(CatalogView::from_books(response.books))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{available_book, borrowed_book};
    use test_log::test;

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let books = vec![
            available_book("http://example.org/library#b1", "Dune"),
            borrowed_book("http://example.org/library#b2", "Emma", "Ann"),
            available_book("http://example.org/library#b3", "Ulysses"),
        ];
        let view = CatalogView::from_books(books.clone());
        assert_eq!(view.rows.len(), 3);
        for book in &books {
            let in_borrow = view.borrow_options.iter().any(|o| o.value == book.id);
            let in_return = view.return_options.iter().any(|o| o.value == book.id);
            assert!(in_borrow ^ in_return, "{} must be in exactly one list", book.id);
            assert_eq!(in_return, book.borrowed);
        }
    }

    #[test]
    fn test_single_available_book_options() {
        let view = CatalogView::from_books(vec![available_book("b1", "T")]);
        assert_eq!(
            view.borrow_options,
            vec![BookOption {
                value: "b1".to_string(),
                label: "b1 - T".to_string()
            }]
        );
        assert!(view.return_options.is_empty());
        assert_eq!(
            view.return_options_html(),
            "<option value=\"\">Select a Book</option>"
        );
        assert_eq!(
            view.borrow_options_html(),
            "<option value=\"\">Select a Book</option><option value=\"b1\">b1 - T</option>"
        );
    }

    #[test]
    fn test_borrowed_row_shows_borrower() {
        let row = CatalogRow::new(borrowed_book("http://example.org/library#b2", "Emma", "Ann"));
        let html = row.to_html();
        assert!(html.contains("class=\"borrowed\""));
        assert!(html.contains("<td>Ann</td>"));
        assert!(html.contains("viewer.html?type=Book&amp;id=b2"));
    }

    #[test]
    fn test_available_row_hides_stale_borrower_fields() {
        let mut book = available_book("b1", "T");
        book.borrower_name = "stale".to_string();
        let html = CatalogRow::new(book).to_html();
        assert!(!html.contains("stale"));
        assert!(!html.contains("borrowed"));
    }
}
