//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! Money columns hold integer minor units. Dates are `YYYY-MM-DD` text and
//! timestamps RFC 3339 text, so both sort correctly as strings. The `*_key`
//! columns hold case-folded copies of searchable text.

use sea_query::Iden;

/// Authors table schema.
#[derive(Iden)]
pub enum Author {
    Table,
    Id,
    Name,
    /// `name` case-folded for search.
    NameKey,
    Bio,
}

/// Categories table schema.
#[derive(Iden)]
pub enum Category {
    Table,
    Id,
    Name,
    Description,
}

/// Books table schema.
#[derive(Iden)]
pub enum Book {
    Table,
    Id,
    CategoryId,
    AuthorId,
    Title,
    /// `title` case-folded for search.
    TitleKey,
    Summary,
    ListPrice,
    Cover,
}

/// Discounts table schema.
#[derive(Iden)]
pub enum Discount {
    Table,
    Id,
    BookId,
    StartDate,
    EndDate,
    DiscountPrice,
}

/// Reviews table schema.
#[derive(Iden)]
pub enum Review {
    Table,
    Id,
    BookId,
    UserId,
    Title,
    Details,
    Rating,
    CreatedAt,
}

/// Orders table schema.
#[derive(Iden)]
pub enum Orders {
    Table,
    Id,
    UserId,
    CreatedAt,
    TotalAmount,
}

/// Order lines table schema.
#[derive(Iden)]
pub enum OrderItem {
    Table,
    Id,
    OrderId,
    BookId,
    Quantity,
    UnitPrice,
}

/// Cart table schema.
#[derive(Iden)]
pub enum CartItem {
    Table,
    Id,
    UserId,
    BookId,
    Quantity,
}

/// SQL for creating every table.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS author (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    bio TEXT
);

CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES category(id),
    author_id INTEGER NOT NULL REFERENCES author(id),
    title TEXT NOT NULL,
    title_key TEXT NOT NULL,
    summary TEXT,
    list_price INTEGER NOT NULL CHECK (list_price > 0),
    cover TEXT
);

CREATE INDEX IF NOT EXISTS idx_book_category ON book(category_id);
CREATE INDEX IF NOT EXISTS idx_book_author ON book(author_id);

CREATE TABLE IF NOT EXISTS discount (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
    start_date TEXT NOT NULL,
    end_date TEXT,
    discount_price INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_discount_book ON discount(book_id);

CREATE TABLE IF NOT EXISTS review (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL CHECK (length(title) <= 120),
    details TEXT,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_book ON review(book_id);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    total_amount INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

CREATE TABLE IF NOT EXISTS order_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES book(id),
    quantity INTEGER NOT NULL CHECK (quantity BETWEEN 1 AND 8),
    unit_price INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_item_order ON order_item(order_id);

CREATE TABLE IF NOT EXISTS cart_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    book_id INTEGER NOT NULL REFERENCES book(id),
    quantity INTEGER NOT NULL CHECK (quantity BETWEEN 1 AND 8),
    UNIQUE (user_id, book_id)
);
"#;
