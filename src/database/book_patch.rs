use crate::config::PatchMode;
use crate::models::book::BookPatchRequest;
use rust_decimal::Decimal;

/// Columns returned by every statement that yields a book row.
pub const BOOK_COLUMNS: &str = "id, title, author, genre, price, stock";

/// A single column assignment of a partial book update.
#[derive(Debug, Clone, PartialEq)]
pub enum BookField {
    Title(String),
    Author(String),
    Genre(String),
    Price(Decimal),
    Stock(i32),
}

impl BookField {
    pub fn column(&self) -> &'static str {
        match self {
            BookField::Title(_) => "title",
            BookField::Author(_) => "author",
            BookField::Genre(_) => "genre",
            BookField::Price(_) => "price",
            BookField::Stock(_) => "stock",
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            BookField::Title(value) | BookField::Author(value) | BookField::Genre(value) => !value.is_empty(),
            BookField::Price(value) => !value.is_zero(),
            BookField::Stock(value) => *value != 0,
        }
    }
}

/// The set of columns a `PATCH /books/<id>` request actually changes.
///
/// Fields always appear in table order (title, author, genre, price, stock),
/// so the placeholders of [`BookChangeset::update_sql`] line up with
/// [`BookChangeset::fields`] and the book id is bound last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookChangeset {
    fields: Vec<BookField>,
}

impl BookChangeset {
    pub fn from_patch(patch: &BookPatchRequest, mode: PatchMode) -> Self {
        let candidates = [
            patch.title.clone().map(BookField::Title),
            patch.author.clone().map(BookField::Author),
            patch.genre.clone().map(BookField::Genre),
            patch.price.map(BookField::Price),
            patch.stock.map(BookField::Stock),
        ];

        let fields = candidates
            .into_iter()
            .flatten()
            .filter(|field| match mode {
                PatchMode::Truthy => field.is_truthy(),
                PatchMode::Present => true,
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[BookField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `title = $1, price = $2, ...`
    pub fn set_clause(&self) -> String {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| format!("{} = ${}", field.column(), index + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Full statement; the id placeholder follows the field placeholders.
    pub fn update_sql(&self) -> String {
        format!(
            "UPDATE books SET {} WHERE id = ${} RETURNING {}",
            self.set_clause(),
            self.fields.len() + 1,
            BOOK_COLUMNS
        )
    }
}
