//! Storefront: the product list and the add-product form. Products can only
//! be created from the dashboard; editing and stock changes stay with the
//! backend.

use tracing::{info, warn};

use crate::api::ApiError;
use crate::models::{Product, ProductCategory, ProductPayload, ProductType};
use crate::state::{EditPhase, Notice, Outcome, Sequencer};
use crate::verses::DraftError;
use crate::worker::Request;

/// Fields of the add-product form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Category,
    ProductType,
    ImageUrl,
    DownloadUrl,
    StockQuantity,
}

impl ProductField {
    pub const ALL: [ProductField; 8] = [
        ProductField::Name,
        ProductField::Description,
        ProductField::Price,
        ProductField::Category,
        ProductField::ProductType,
        ProductField::ImageUrl,
        ProductField::DownloadUrl,
        ProductField::StockQuantity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProductField::Name => "Name",
            ProductField::Description => "Description",
            ProductField::Price => "Price",
            ProductField::Category => "Category",
            ProductField::ProductType => "Type",
            ProductField::ImageUrl => "Image URL",
            ProductField::DownloadUrl => "Download URL",
            ProductField::StockQuantity => "Stock",
        }
    }

    /// Name, description and price must be filled before submit.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            ProductField::Name | ProductField::Description | ProductField::Price
        )
    }

    /// Category and type cycle through fixed values instead of taking text.
    pub fn is_choice(self) -> bool {
        matches!(self, ProductField::Category | ProductField::ProductType)
    }

    /// Next or previous field, wrapping at either end.
    pub fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// A new value for one draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValue {
    Text(String),
    Category(ProductCategory),
    Type(ProductType),
}

/// Add-product buffer. Numbers stay as typed until submit coerces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: ProductCategory,
    pub product_type: ProductType,
    pub image_url: String,
    pub download_url: String,
    pub stock_quantity: String,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            category: ProductCategory::TechTools,
            product_type: ProductType::Digital,
            image_url: String::new(),
            download_url: String::new(),
            stock_quantity: "0".to_string(),
        }
    }
}

impl ProductDraft {
    /// Display text for `field`; choice fields render their label.
    pub fn text(&self, field: ProductField) -> String {
        match field {
            ProductField::Name => self.name.clone(),
            ProductField::Description => self.description.clone(),
            ProductField::Price => self.price.clone(),
            ProductField::Category => self.category.label().to_string(),
            ProductField::ProductType => self.product_type.label().to_string(),
            ProductField::ImageUrl => self.image_url.clone(),
            ProductField::DownloadUrl => self.download_url.clone(),
            ProductField::StockQuantity => self.stock_quantity.clone(),
        }
    }

    /// Store `value` in `field`. Returns `false` when the value kind does not
    /// fit the field, leaving the draft untouched.
    pub fn set(&mut self, field: ProductField, value: ProductValue) -> bool {
        match (field, value) {
            (ProductField::Category, ProductValue::Category(category)) => {
                self.category = category
            }
            (ProductField::ProductType, ProductValue::Type(kind)) => self.product_type = kind,
            (field, ProductValue::Text(text)) if !field.is_choice() => {
                let slot = match field {
                    ProductField::Name => &mut self.name,
                    ProductField::Description => &mut self.description,
                    ProductField::Price => &mut self.price,
                    ProductField::ImageUrl => &mut self.image_url,
                    ProductField::DownloadUrl => &mut self.download_url,
                    ProductField::StockQuantity => &mut self.stock_quantity,
                    ProductField::Category | ProductField::ProductType => return false,
                };
                *slot = text;
            }
            _ => return false,
        }
        true
    }

    /// Check required fields and coerce price and stock to numbers. Range
    /// checks are left to the backend.
    pub fn to_payload(&self) -> Result<ProductPayload, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::Missing("Name"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(DraftError::Missing("Description"));
        }
        let price_raw = self.price.trim();
        if price_raw.is_empty() {
            return Err(DraftError::Missing("Price"));
        }
        let price = price_raw
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| DraftError::NotANumber {
                field: "Price",
                value: price_raw.to_string(),
            })?;

        let stock_raw = self.stock_quantity.trim();
        let stock_quantity = if stock_raw.is_empty() {
            0
        } else {
            stock_raw
                .parse::<i64>()
                .map_err(|_| DraftError::NotANumber {
                    field: "Stock",
                    value: stock_raw.to_string(),
                })?
        };

        Ok(ProductPayload {
            name: name.to_string(),
            description: description.to_string(),
            price,
            category: self.category,
            product_type: self.product_type,
            image_url: optional(&self.image_url),
            download_url: optional(&self.download_url),
            stock_quantity,
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Inputs to [`Store::update`]: user intents and worker responses.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMsg {
    Mounted,
    Loaded {
        ticket: u64,
        result: Result<Vec<Product>, ApiError>,
    },
    StartCreate,
    FieldChanged(ProductField, ProductValue),
    CancelCreate,
    SubmitRequested,
    SubmitSucceeded(Product),
    SubmitFailed(ApiError),
}

/// Product list plus the add-product form state.
#[derive(Debug, Default)]
pub struct Store {
    products: Vec<Product>,
    editor: EditPhase<ProductDraft>,
    tickets: Sequencer,
    loading: bool,
    loaded: bool,
    selected: usize,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one message. Returned requests go to the worker; list responses
    /// with an outdated ticket are dropped.
    pub fn update(&mut self, msg: StoreMsg) -> Outcome {
        match msg {
            StoreMsg::Mounted => self.refresh(),
            StoreMsg::Loaded { ticket, result } => {
                if !self.tickets.is_current(ticket) {
                    return Outcome::none();
                }
                self.loading = false;
                match result {
                    Ok(products) => {
                        self.products = products;
                        self.loaded = true;
                        if self.selected >= self.products.len() {
                            self.selected = self.products.len().saturating_sub(1);
                        }
                        Outcome::none()
                    }
                    Err(err) => {
                        warn!(error = %err, "fetching products failed");
                        Outcome::notice(Notice::error(format!("Could not load products: {err}")))
                    }
                }
            }
            StoreMsg::StartCreate => {
                if self.editor.start(None, ProductDraft::default()) {
                    Outcome::none()
                } else {
                    Outcome::notice(Notice::error("Wait for the current save to finish."))
                }
            }
            StoreMsg::FieldChanged(field, value) => {
                if let Some(edit) = self.editor.editing_mut() {
                    if edit.draft.set(field, value) {
                        edit.error = None;
                    }
                }
                Outcome::none()
            }
            StoreMsg::CancelCreate => {
                if self.editor.cancel() {
                    Outcome::notice(Notice::info("Add product cancelled."))
                } else {
                    Outcome::none()
                }
            }
            StoreMsg::SubmitRequested => self.submit(),
            StoreMsg::SubmitSucceeded(product) => {
                if !self.editor.save_succeeded() {
                    return Outcome::none();
                }
                info!(id = %product.id, "product created");
                self.refresh()
                    .with_notice(Notice::info(format!("Added \"{}\".", product.name)))
            }
            StoreMsg::SubmitFailed(err) => {
                warn!(error = %err, "creating product failed");
                let message = err.to_string();
                self.editor.save_failed(message.clone());
                Outcome::notice(Notice::error(message))
            }
        }
    }

    fn refresh(&mut self) -> Outcome {
        self.loading = true;
        Outcome::request(Request::ListProducts {
            ticket: self.tickets.next(),
        })
    }

    fn submit(&mut self) -> Outcome {
        let payload = {
            let Some(edit) = self.editor.editing_mut() else {
                return Outcome::none();
            };
            match edit.draft.to_payload() {
                Ok(payload) => payload,
                Err(err) => {
                    let message = err.to_string();
                    edit.error = Some(message.clone());
                    return Outcome::notice(Notice::error(message));
                }
            }
        };
        self.editor.begin_save();
        Outcome::request(Request::CreateProduct { payload })
            .with_notice(Notice::info("Saving product..."))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The add-product form, if one is open or saving.
    pub fn editor(&self) -> &EditPhase<ProductDraft> {
        &self.editor
    }

    /// A product list request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// At least one list response has been applied.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Move the highlight by `offset`, clamped to the list.
    pub fn move_selection(&mut self, offset: isize) {
        if self.products.is_empty() {
            return;
        }
        let len = self.products.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }
}
