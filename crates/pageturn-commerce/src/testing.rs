//! In-memory [`CatalogStore`] for unit tests.

use crate::cart::{CartItem, CartLine};
use crate::catalog::{active_discount, Author, Book, BookDetails, BookListing, Category, Discount};
use crate::checkout::{NewOrder, Order, OrderItem, PendingLine};
use crate::error::CommerceError;
use crate::ids::{AuthorId, BookId, CategoryId, DiscountId, OrderId, OrderItemId, ReviewId, UserId};
use crate::money::{Currency, Money};
use crate::review::{NewReview, Review, ReviewQuery, ReviewSort};
use crate::search::{BookPage, BookQuery, Page, PageRequest, SortKey, TitleSearch};
use crate::store::{CatalogStore, OrderWriter};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A USD book by author 1 in category 1.
pub fn book(id: i64, title: &str, cents: i64) -> Book {
    Book {
        id: BookId::new(id),
        category_id: CategoryId::new(1),
        author_id: AuthorId::new(1),
        title: title.to_string(),
        summary: None,
        list_price: Money::new(cents, Currency::USD),
        cover: None,
        discounts: Vec::new(),
    }
}

#[derive(Default)]
struct State {
    authors: Vec<Author>,
    categories: Vec<Category>,
    books: Vec<Book>,
    reviews: Vec<Review>,
    orders: Vec<Order>,
    carts: Vec<CartItem>,
    next_discount: i64,
    next_review: i64,
    next_order: i64,
    next_item: i64,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp(1_714_521_600 + self.clock, 0).unwrap()
    }

    fn listing(&self, book: &Book, as_of: NaiveDate) -> BookListing {
        let ratings: Vec<i64> = self
            .reviews
            .iter()
            .filter(|r| r.book_id == book.id)
            .map(|r| r.rating)
            .collect();
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
        };
        let discount_price = active_discount(book, as_of).map(|d| d.discount_price);
        BookListing {
            id: book.id,
            title: book.title.clone(),
            summary: book.summary.clone(),
            list_price: book.list_price,
            cover: book.cover.clone(),
            author: self.author(book.author_id),
            category: self.category(book.category_id),
            discount_price,
            effective_price: discount_price.unwrap_or(book.list_price),
            review_count: ratings.len() as i64,
            average_rating,
        }
    }

    fn author(&self, id: AuthorId) -> Author {
        self.authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .unwrap_or_else(|| Author::new(id, "Unknown"))
    }

    fn category(&self, id: CategoryId) -> Category {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| Category::new(id, "Unknown"))
    }
}

fn matches_term(listing: &BookListing, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    listing.title.to_lowercase().contains(&term) || listing.author.name.to_lowercase().contains(&term)
}

fn paginate<T>(items: Vec<T>, total: i64, offset: i64, limit: i64) -> Page<T> {
    let rows = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Page::new(rows, total, offset, limit)
}

fn compare(sort: SortKey, a: &BookListing, b: &BookListing) -> CmpOrdering {
    let by_price = a.effective_price.amount_cents.cmp(&b.effective_price.amount_cents);
    let primary = match sort {
        SortKey::OnSale => b
            .discount_price
            .is_some()
            .cmp(&a.discount_price.is_some())
            .then(by_price),
        SortKey::OnSaleHome => b.savings().amount_cents.cmp(&a.savings().amount_cents),
        SortKey::Popularity => b.review_count.cmp(&a.review_count).then(by_price),
        SortKey::Recommended => b
            .average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(CmpOrdering::Equal)
            .then(by_price),
        SortKey::PriceAsc => by_price,
        SortKey::PriceDesc => by_price.reverse(),
    };
    primary.then(a.id.cmp(&b.id))
}

/// Store double with call counting and failure injection.
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    calls: AtomicUsize,
    batch_fetches: AtomicUsize,
    rollbacks: Arc<AtomicUsize>,
    fail_items: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            calls: AtomicUsize::new(0),
            batch_fetches: AtomicUsize::new(0),
            rollbacks: Arc::new(AtomicUsize::new(0)),
            fail_items: AtomicBool::new(false),
        }
    }

    /// One author, one category and the given books with ids from 1.
    pub fn with_books(books: &[(&str, i64)]) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            state.authors.push(Author::new(AuthorId::new(1), "Anonymous"));
            state.categories.push(Category::new(CategoryId::new(1), "General"));
            for (i, (title, cents)) in books.iter().enumerate() {
                state.books.push(book(i as i64 + 1, title, *cents));
            }
        }
        store
    }

    pub fn add_discount(
        &self,
        book_id: BookId,
        cents: i64,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> DiscountId {
        let mut state = self.state.lock().unwrap();
        state.next_discount += 1;
        let id = DiscountId::new(state.next_discount);
        let book = state.books.iter_mut().find(|b| b.id == book_id).unwrap();
        book.discounts.push(Discount {
            id,
            book_id,
            start_date: start,
            end_date: end,
            discount_price: Money::new(cents, book.list_price.currency),
        });
        id
    }

    pub fn set_discount_price(&self, id: DiscountId, cents: i64) {
        let mut state = self.state.lock().unwrap();
        for book in state.books.iter_mut() {
            for discount in book.discounts.iter_mut().filter(|d| d.id == id) {
                discount.discount_price.amount_cents = cents;
            }
        }
    }

    /// Make every subsequent line insert fail.
    pub fn fail_order_items(&self) {
        self.fail_items.store(true, Ordering::SeqCst);
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batch_fetches(&self) -> usize {
        self.batch_fetches.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn query_books(
        &self,
        query: &BookQuery,
        as_of: NaiveDate,
    ) -> Result<BookPage, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let filters = &query.filters;
        let mut rows: Vec<BookListing> = state
            .books
            .iter()
            .filter(|b| filters.category_id.map_or(true, |id| b.category_id == id))
            .filter(|b| filters.author_id.map_or(true, |id| b.author_id == id))
            .map(|b| state.listing(b, as_of))
            .filter(|l| {
                filters
                    .min_rating
                    .map_or(true, |min| l.average_rating >= min as f64)
            })
            .filter(|l| filters.search.as_deref().map_or(true, |t| matches_term(l, t)))
            .collect();
        let total = rows.len() as i64;
        if query.sort.restricts_to_discounted() {
            rows.retain(|l| l.discount_price.is_some());
        }
        rows.sort_by(|a, b| compare(query.sort, a, b));
        Ok(paginate(rows, total, query.offset, query.limit))
    }

    async fn search_books(
        &self,
        search: &TitleSearch,
        as_of: NaiveDate,
    ) -> Result<BookPage, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let mut rows: Vec<BookListing> = state
            .books
            .iter()
            .map(|b| state.listing(b, as_of))
            .filter(|l| matches_term(l, &search.term))
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        let total = rows.len() as i64;
        Ok(paginate(rows, total, search.offset, search.limit))
    }

    async fn get_book(
        &self,
        id: BookId,
        as_of: NaiveDate,
    ) -> Result<Option<BookDetails>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(state.books.iter().find(|b| b.id == id).map(|b| BookDetails {
            book: b.clone(),
            author: state.author(b.author_id),
            category: state.category(b.category_id),
            discount_price: active_discount(b, as_of).map(|d| d.discount_price),
        }))
    }

    async fn get_books(&self, ids: &[BookId]) -> Result<Vec<Book>, CommerceError> {
        self.hit();
        self.batch_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .books
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    async fn book_exists(&self, id: BookId) -> Result<bool, CommerceError> {
        self.hit();
        Ok(self.state.lock().unwrap().books.iter().any(|b| b.id == id))
    }

    async fn list_categories(&self, page: PageRequest) -> Result<Vec<Category>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(paginate(state.categories.clone(), 0, page.offset, page.limit).items)
    }

    async fn list_authors(&self, page: PageRequest) -> Result<Vec<Author>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(paginate(state.authors.clone(), 0, page.offset, page.limit).items)
    }

    async fn begin_order(&self) -> Result<Box<dyn OrderWriter>, CommerceError> {
        self.hit();
        Ok(Box::new(MemoryOrderWriter {
            state: Arc::clone(&self.state),
            rollbacks: Arc::clone(&self.rollbacks),
            fail_items: self.fail_items.load(Ordering::SeqCst),
            header: None,
            items: Vec::new(),
        }))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_reviews(
        &self,
        book_id: BookId,
        query: &ReviewQuery,
    ) -> Result<Vec<Review>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .filter(|r| query.rating.map_or(true, |rating| r.rating == rating))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if query.sort == ReviewSort::DateDesc {
            reviews.reverse();
        }
        Ok(paginate(reviews, 0, query.offset, query.limit).items)
    }

    async fn get_review(&self, id: ReviewId) -> Result<Option<Review>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        Ok(state.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, CommerceError> {
        self.hit();
        let mut state = self.state.lock().unwrap();
        state.next_review += 1;
        let stored = Review {
            id: ReviewId::new(state.next_review),
            book_id: review.book_id,
            user_id: review.user_id,
            title: review.title.clone(),
            details: review.details.clone(),
            rating: review.rating,
            created_at: state.tick(),
        };
        state.reviews.push(stored.clone());
        Ok(stored)
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, CommerceError> {
        self.hit();
        let mut state = self.state.lock().unwrap();
        let before = state.reviews.len();
        state.reviews.retain(|r| r.id != id);
        Ok(state.reviews.len() < before)
    }

    async fn get_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, CommerceError> {
        self.hit();
        let state = self.state.lock().unwrap();
        let mut items: Vec<CartItem> = state
            .carts
            .iter()
            .filter(|c| c.user_id == user_id)
            .copied()
            .collect();
        items.sort_by_key(|c| c.book_id);
        Ok(items)
    }

    async fn replace_cart(
        &self,
        user_id: UserId,
        lines: &[CartLine],
    ) -> Result<(), CommerceError> {
        self.hit();
        let mut state = self.state.lock().unwrap();
        state.carts.retain(|c| c.user_id != user_id);
        state.carts.extend(lines.iter().map(|l| CartItem {
            user_id,
            book_id: l.book_id,
            quantity: l.quantity,
        }));
        Ok(())
    }
}

struct MemoryOrderWriter {
    state: Arc<Mutex<State>>,
    rollbacks: Arc<AtomicUsize>,
    fail_items: bool,
    header: Option<(OrderId, NewOrder)>,
    items: Vec<OrderItem>,
}

#[async_trait]
impl OrderWriter for MemoryOrderWriter {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, CommerceError> {
        let mut state = self.state.lock().unwrap();
        state.next_order += 1;
        let id = OrderId::new(state.next_order);
        self.header = Some((id, *order));
        Ok(id)
    }

    async fn insert_order_items(
        &mut self,
        order_id: OrderId,
        lines: &[PendingLine],
    ) -> Result<(), CommerceError> {
        if self.fail_items {
            return Err(CommerceError::Database("injected line failure".into()));
        }
        let mut state = self.state.lock().unwrap();
        for line in lines {
            state.next_item += 1;
            self.items.push(OrderItem {
                id: OrderItemId::new(state.next_item),
                order_id,
                book_id: line.book_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CommerceError> {
        let MemoryOrderWriter {
            state,
            header,
            items,
            ..
        } = *self;
        let Some((id, header)) = header else {
            return Err(CommerceError::Database("nothing to commit".into()));
        };
        let mut state = state.lock().unwrap();
        let created_at = state.tick();
        state.orders.push(Order {
            id,
            user_id: header.user_id,
            created_at,
            total_amount: header.total_amount,
            items,
        });
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), CommerceError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
