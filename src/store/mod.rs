mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Builds the replacement rows for a sync from the image snapshot taken
/// inside the replace transaction.
pub type MenuMerge<'a> = dyn Fn(&ImageSnapshot) -> Vec<MenuCacheRow> + 'a;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Settings
    fn get_company_code(&self) -> Result<Option<String>>;
    fn set_company_code(&self, code: &str) -> Result<()>;

    // POS menu cache
    fn list_menu_cache(&self) -> Result<Vec<MenuCacheRow>>;
    /// Atomically replaces every cached row of `company_id` with the rows
    /// produced by `merge`. Returns the number of rows inserted.
    fn replace_menu_cache(&self, company_id: i64, merge: &MenuMerge<'_>) -> Result<usize>;
    fn get_menu_images(&self, serials: &[String]) -> Result<ImageSnapshot>;
    fn set_menu_image(&self, serial: &str, image: &str) -> Result<usize>;

    // Local catalog
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn create_category(&self, name: &str) -> Result<Category>;
    fn list_menu_items(&self) -> Result<Vec<MenuItem>>;
    fn create_menu_item(&self, item: &MenuItemInput) -> Result<MenuItem>;
    fn update_menu_item(&self, id: i64, item: &MenuItemInput) -> Result<()>;
    fn delete_menu_items(&self, ids: &[i64]) -> Result<usize>;

    // Reservations
    fn create_reservation(&self, reservation: &ReservationInput) -> Result<i64>;
    fn get_reservation(&self, id: i64) -> Result<Option<Reservation>>;
    fn list_reservations(&self) -> Result<Vec<Reservation>>;
    fn update_reservation(&self, id: i64, reservation: &ReservationInput) -> Result<()>;
    fn delete_reservation(&self, id: i64) -> Result<bool>;

    // Users and address reference data
    fn create_user(&self, user: &NewUser) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_profile(&self, profile: &ProfileUpdate) -> Result<()>;
    fn list_districts(&self) -> Result<Vec<District>>;
    fn list_thanas(&self, district_id: i64) -> Result<Vec<Thana>>;

    // Site content
    fn create_review(&self, name: &str, review_text: &str, rating: i64) -> Result<i64>;
    fn list_reviews(&self) -> Result<Vec<Review>>;
    fn get_about(&self) -> Result<Option<About>>;
    /// Replaces the about section, returning the new row id and the image of
    /// the row it replaced.
    fn replace_about(
        &self,
        heading: &str,
        text: &str,
        image: Option<&str>,
    ) -> Result<(i64, Vec<String>)>;
    fn get_hero(&self) -> Result<Option<Hero>>;
    /// Replaces the hero banner, returning the images of the removed rows.
    fn replace_hero(&self, name: &str, image: &str) -> Result<Vec<String>>;
    fn list_table_layout(&self) -> Result<Vec<TableLayoutItem>>;
    fn replace_table_layout(&self, layout: &[TableLayoutItem]) -> Result<()>;

    fn close(&self) -> Result<()>;
}
