//! Shopping cart persisted under the `cart` storage key.
//!
//! DESIGN
//! ======
//! The stored value is a JSON array of line items, each the product object
//! with a `quantity` field merged in. Lines are matched on `id` alone. Every operation reads and rewrites the
//! whole list; there is no incremental update.
//!
//! Invariants:
//! - at most one line per product id;
//! - `quantity >= 1` on every stored line. Dropping a quantity to zero or
//!   below removes the line instead.
//!
//! CONCURRENCY
//! ===========
//! Mutations are read-modify-compare-and-swap. If another writer (a second
//! tab, a second CLI process) changed the list between our read and our
//! write, the mutation is replayed on the fresh list. After
//! `MAX_CAS_ATTEMPTS` lost races the call fails with `Contention`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::net::types::Product;
use crate::storage::{CART_KEY, SharedStorage, StorageError};

pub const MAX_CAS_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The `cart` key holds something that is not a JSON array of line items.
    #[error("stored cart is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("cart encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The requested quantity does not fit a line item.
    #[error("quantity out of range for product {product_id}")]
    QuantityOutOfRange { product_id: i64 },

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("cart changed concurrently {attempts} times; update abandoned")]
    Contention { attempts: usize },
}

/// A product plus how many of it are in the cart.
///
/// Only `id` and `quantity` are interpreted. Every other product field is
/// carried through untouched, so a line written by another client (or one
/// holding just `id` and `quantity`) survives a rewrite unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub quantity: u32,
}

impl LineItem {
    /// Snapshot `product` into a new line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Encode`] if the product does not serialize to an object.
    pub fn from_product(product: &Product, quantity: u32) -> Result<Self, CartError> {
        let mut fields = match serde_json::to_value(product).map_err(CartError::Encode)? {
            Value::Object(fields) => fields,
            other => {
                return Err(CartError::Encode(serde::ser::Error::custom(format!(
                    "product serialized to {other}, expected an object"
                ))));
            }
        };
        fields.remove("id");
        Ok(Self { id: product.id, fields, quantity })
    }

    /// Display name, when the line carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Unit price; a missing or non-numeric price counts as zero.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.fields.get("price").and_then(Value::as_f64).unwrap_or(0.0)
    }

    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.price() * f64::from(self.quantity)
    }
}

fn decode(raw: Option<&str>) -> Result<Vec<LineItem>, CartError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw).map_err(|e| {
        tracing::warn!(error = %e, "stored cart is not a valid line-item list");
        CartError::Corrupt(e)
    })
}

#[derive(Clone)]
pub struct CartManager {
    storage: SharedStorage,
}

impl CartManager {
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Current line items; empty when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Corrupt`] if the stored value does not parse.
    pub fn get_items(&self) -> Result<Vec<LineItem>, CartError> {
        decode(self.storage.get_item(CART_KEY)?.as_deref())
    }

    /// Add `quantity` of `product`, merging into an existing line with the same id.
    ///
    /// A zero quantity changes nothing and writes nothing.
    ///
    /// # Errors
    ///
    /// Storage, corrupt cart, overflow, or contention failures.
    pub fn add_item(&self, product: &Product, quantity: u32) -> Result<Vec<LineItem>, CartError> {
        if quantity == 0 {
            return self.get_items();
        }
        let line = LineItem::from_product(product, quantity)?;
        self.mutate(|items| {
            match items.iter_mut().find(|item| item.id == product.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(quantity)
                        .ok_or(CartError::QuantityOutOfRange { product_id: product.id })?;
                }
                None => items.push(line.clone()),
            }
            Ok(true)
        })
    }

    /// [`CartManager::add_item`] with the default quantity of one.
    ///
    /// # Errors
    ///
    /// Same as [`CartManager::add_item`].
    pub fn add_one(&self, product: &Product) -> Result<Vec<LineItem>, CartError> {
        self.add_item(product, 1)
    }

    /// Set the quantity of an existing line; `<= 0` removes the line.
    ///
    /// An unknown `product_id` is a no-op that returns the current list.
    ///
    /// # Errors
    ///
    /// Storage, corrupt cart, out-of-range quantity, or contention failures.
    pub fn update_quantity(&self, product_id: i64, quantity: i64) -> Result<Vec<LineItem>, CartError> {
        self.mutate(|items| {
            let Some(pos) = items.iter().position(|item| item.id == product_id) else {
                return Ok(false);
            };
            if quantity <= 0 {
                items.remove(pos);
                return Ok(true);
            }
            let quantity = u32::try_from(quantity).map_err(|_| CartError::QuantityOutOfRange { product_id })?;
            if let Some(item) = items.get_mut(pos) {
                item.quantity = quantity;
            }
            Ok(true)
        })
    }

    /// Drop the line for `product_id` and persist the rest.
    ///
    /// # Errors
    ///
    /// Storage, corrupt cart, or contention failures.
    pub fn remove_item(&self, product_id: i64) -> Result<Vec<LineItem>, CartError> {
        self.mutate(|items| {
            items.retain(|item| item.id != product_id);
            Ok(true)
        })
    }

    /// Delete the stored cart. Also the way out of a corrupt cart.
    ///
    /// # Errors
    ///
    /// Propagates storage write failures.
    pub fn clear(&self) -> Result<Vec<LineItem>, CartError> {
        self.storage.remove_item(CART_KEY)?;
        Ok(Vec::new())
    }

    /// Total number of units across all lines.
    ///
    /// # Errors
    ///
    /// Same as [`CartManager::get_items`].
    pub fn item_count(&self) -> Result<u64, CartError> {
        Ok(self.get_items()?.iter().map(|item| u64::from(item.quantity)).sum())
    }

    /// Sum of `price * quantity` across all lines.
    ///
    /// # Errors
    ///
    /// Same as [`CartManager::get_items`].
    pub fn total(&self) -> Result<f64, CartError> {
        Ok(self.get_items()?.iter().map(LineItem::subtotal).sum())
    }

    /// Apply `change` to the stored list and compare-and-swap the result back.
    ///
    /// `change` returns whether the list should be written; `false` skips the
    /// write and returns the list as read.
    fn mutate<F>(&self, mut change: F) -> Result<Vec<LineItem>, CartError>
    where
        F: FnMut(&mut Vec<LineItem>) -> Result<bool, CartError>,
    {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let raw = self.storage.get_item(CART_KEY)?;
            let mut items = decode(raw.as_deref())?;
            if !change(&mut items)? {
                return Ok(items);
            }
            let encoded = serde_json::to_string(&items).map_err(CartError::Encode)?;
            if self.storage.compare_and_swap(CART_KEY, raw.as_deref(), Some(&encoded))? {
                return Ok(items);
            }
            tracing::debug!(attempt, "cart changed during update; replaying");
        }
        tracing::warn!(attempts = MAX_CAS_ATTEMPTS, "cart update abandoned after repeated conflicts");
        Err(CartError::Contention { attempts: MAX_CAS_ATTEMPTS })
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
