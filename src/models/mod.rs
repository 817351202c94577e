pub mod user;
pub mod concert;
pub mod booking;
pub mod catalog;
pub mod forms;

pub use user::{AuthResponse, ErrorBody, Role, User};
pub use concert::{Availability, Concert, ConcertStatus};
pub use booking::{Booking, BookingConfirmation, BookingRequest, BookingsPage, BookingsQuery, Pagination};
pub use catalog::{CatalogPage, CatalogQuery, DateRange, SortKey, StatusFilter, CATALOG_PAGE_SIZE};
pub use forms::{ConcertForm, LoginForm, RegisterForm};
