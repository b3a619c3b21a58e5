//! Cart and line item types.

use crate::cart::Mutation;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A product description as handed to `add_to_cart`, before it has a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewLineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Display image.
    pub image_url: String,
    /// Unit price, passed through untouched.
    #[serde(rename = "price")]
    pub unit_price: f64,
}

impl NewLineItem {
    /// Create a new candidate item.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            unit_price,
        }
    }

    /// Check that the item can be stored and read back unchanged.
    ///
    /// JSON has no encoding for NaN or infinity, so the price must be finite.
    pub fn validate(&self) -> Result<(), InvalidCart> {
        if self.unit_price.is_finite() {
            Ok(())
        } else {
            Err(InvalidCart::NonFinitePrice(self.id.clone()))
        }
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Display image.
    pub image_url: String,
    /// Unit price.
    #[serde(rename = "price")]
    pub unit_price: f64,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl LineItem {
    /// Line total (`unit_price * quantity`).
    pub fn total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            unit_price: item.unit_price,
            quantity: 1,
        }
    }
}

/// Reasons an item or item list is not a valid cart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidCart {
    /// An item was stored with quantity 0.
    #[error("item {0} has quantity 0")]
    ZeroQuantity(ProductId),

    /// Two items share an id.
    #[error("duplicate item id {0}")]
    DuplicateId(ProductId),

    /// An item's price is NaN or infinite.
    #[error("item {0} has a non-finite price")]
    NonFinitePrice(ProductId),
}

/// A shopping cart: ordered line items with unique ids.
///
/// Serialized as a bare JSON array of line items. Deserializing rejects
/// documents that break the cart invariants.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a persisted cart.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the cart for persistence.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Add an item to the cart.
    ///
    /// A new id is appended with quantity 1. An id already in the cart is
    /// incremented instead, leaving its stored title, image and price as they were.
    /// Items that fail [`NewLineItem::validate`] are rejected and the cart is unchanged.
    pub fn add(&mut self, candidate: NewLineItem) -> Result<Mutation, InvalidCart> {
        candidate.validate()?;
        Ok(self.merge(candidate))
    }

    /// Add an already validated item.
    pub(crate) fn merge(&mut self, candidate: NewLineItem) -> Mutation {
        if self.contains(&candidate.id) {
            return self.increment(&candidate.id);
        }
        self.items.push(LineItem::from(candidate));
        Mutation::Added
    }

    /// Raise an item's quantity by one.
    pub fn increment(&mut self, id: &ProductId) -> Mutation {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                Mutation::Incremented {
                    quantity: item.quantity,
                }
            }
            None => Mutation::NotFound,
        }
    }

    /// Lower an item's quantity by one, removing it when it reaches zero.
    pub fn decrement(&mut self, id: &ProductId) -> Mutation {
        let Some(index) = self.items.iter().position(|i| &i.id == id) else {
            return Mutation::NotFound;
        };

        let item = &mut self.items[index];
        if item.quantity > 1 {
            item.quantity -= 1;
            Mutation::Decremented {
                quantity: item.quantity,
            }
        } else {
            self.items.remove(index);
            Mutation::Removed
        }
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Get an item by id.
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if an item is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals. No tax or discounts.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::total).sum()
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(InvalidCart::ZeroQuantity(item.id.clone()));
            }
            if !item.unit_price.is_finite() {
                return Err(InvalidCart::NonFinitePrice(item.id.clone()));
            }
            if !seen.insert(&item.id) {
                return Err(InvalidCart::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}
