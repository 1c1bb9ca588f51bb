//! Product listing filters and sort orders.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::Clp;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Sort order for the product listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Every option, in the order shown in the sort dropdown.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
    ];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    /// Dropdown label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Relevancia",
            Self::PriceAsc => "Precio: menor a mayor",
            Self::PriceDesc => "Precio: mayor a menor",
            Self::NameAsc => "Nombre: A-Z",
            Self::NameDesc => "Nombre: Z-A",
        }
    }

    /// Parse a query-string value. Unknown values mean no sorting.
    #[must_use]
    pub fn from_query(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == value.trim())
            .unwrap_or_default()
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::None => Ordering::Equal,
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        }
    }
}

/// Filters applied to the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match; `None` means all categories.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Clp>,
    /// Inclusive upper price bound.
    pub max_price: Option<Clp>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl ProductFilter {
    /// Build a filter from raw query-string values.
    ///
    /// Blank values and the `all` category are treated as absent, unparsable
    /// prices are ignored, and a reversed price range is swapped.
    #[must_use]
    pub fn from_query(
        category: Option<&str>,
        min: Option<&str>,
        max: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
    ) -> Self {
        let category = non_blank(category)
            .filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORIES))
            .map(str::to_owned);
        let parse_price = |raw: Option<&str>| {
            non_blank(raw)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .map(Clp::new)
        };
        let mut min_price = parse_price(min);
        let mut max_price = parse_price(max);
        if let (Some(lo), Some(hi)) = (min_price, max_price)
            && lo > hi
        {
            min_price = Some(hi);
            max_price = Some(lo);
        }

        Self {
            category,
            min_price,
            max_price,
            search: non_blank(search).map(str::to_lowercase),
            sort: sort.map(SortOrder::from_query).unwrap_or_default(),
        }
    }

    /// `true` if the product passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && &product.category != category
        {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if let Some(needle) = &self.search
            && !product.name.to_lowercase().contains(needle.as_str())
        {
            return false;
        }
        true
    }

    /// Filter and sort a product list. The sort is stable.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut selected: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Distinct categories present in a product list, sorted.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Lowest and highest price in a product list, for the price range inputs.
#[must_use]
pub fn price_bounds(products: &[Product]) -> (Clp, Clp) {
    let min = products.iter().map(|p| p.price).min().unwrap_or_default();
    let max = products.iter().map(|p| p.price).max().unwrap_or_default();
    (min, max)
}
