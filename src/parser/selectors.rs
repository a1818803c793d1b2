//! CSS selectors for the index table

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse constant selectors
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Every row of every table, in document order
    pub static ref TABLE_ROW: Selector = parse_selector!("table tr");

    /// Data cells of a row
    pub static ref ROW_CELL: Selector = parse_selector!("td");

    /// Anchors that actually carry a link
    pub static ref LINK: Selector = parse_selector!("a[href]");
}
